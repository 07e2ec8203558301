use crate::cli::actions::Action;
use crate::turnstile::VerifierConfig;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let secret = matches
        .get_one::<String>("turnstile-secret")
        .map(|s: &String| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --turnstile-secret"))?;

    let endpoint = matches
        .get_one::<String>("turnstile-endpoint")
        .context("missing required argument: --turnstile-endpoint")?;

    let endpoint = Url::parse(endpoint).context("invalid Turnstile endpoint URL")?;

    let timeout = matches
        .get_one::<u64>("verifier-timeout-ms")
        .copied()
        .unwrap_or(5000);

    let allowed_origins = matches
        .get_many::<String>("allowed-origins")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        verifier: VerifierConfig {
            secret,
            endpoint,
            timeout: Duration::from_millis(timeout),
        },
        allowed_origins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_dispatch_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "turngate",
            "--port",
            "9000",
            "--turnstile-secret",
            "secret-key",
            "--turnstile-endpoint",
            "http://localhost:8081/siteverify",
            "--verifier-timeout-ms",
            "1500",
            "--allowed-origins",
            "https://app.example",
        ]);

        let Action::Server {
            port,
            verifier,
            allowed_origins,
        } = handler(&matches)?;

        assert_eq!(port, 9000);
        assert_eq!(verifier.secret.expose_secret(), "secret-key");
        assert_eq!(
            verifier.endpoint.as_str(),
            "http://localhost:8081/siteverify"
        );
        assert_eq!(verifier.timeout, Duration::from_millis(1500));
        assert_eq!(allowed_origins, vec!["https://app.example".to_string()]);

        Ok(())
    }

    #[test]
    fn test_dispatch_rejects_bad_endpoint() {
        let matches = commands::new().get_matches_from(vec![
            "turngate",
            "--turnstile-secret",
            "secret-key",
            "--turnstile-endpoint",
            "not a url",
        ]);

        assert!(handler(&matches).is_err());
    }
}
