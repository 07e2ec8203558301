use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            verifier,
            allowed_origins,
        } => {
            crate::turngate::new(port, verifier, allowed_origins).await?;
        }
    }

    Ok(())
}
