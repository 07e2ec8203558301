pub mod server;

use crate::turnstile::VerifierConfig;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        verifier: VerifierConfig,
        allowed_origins: Vec<String>,
    },
}
