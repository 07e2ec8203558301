pub mod cli;
pub mod turngate;
pub mod turnstile;
