//! Client for the Cloudflare Turnstile siteverify endpoint.
//!
//! The verifier holds a reqwest client so the connection pool is reused
//! between calls. Verification is never retried: tokens are single-use
//! upstream and a second exchange for the same token cannot succeed.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Process-wide verifier settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub secret: SecretString,
    pub endpoint: Url,
    pub timeout: Duration,
}

/// Parsed outcome of a siteverify exchange. Unknown response fields are ignored.
#[derive(Debug, Deserialize)]
pub struct VerifyVerdict {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

#[derive(Debug)]
pub enum VerifierError {
    Transport(reqwest::Error),
    UpstreamStatus(StatusCode),
    Malformed(serde_json::Error),
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport failure: {err}"),
            Self::UpstreamStatus(status) => write!(f, "unexpected upstream status: {status}"),
            Self::Malformed(err) => write!(f, "malformed siteverify response: {err}"),
        }
    }
}

impl std::error::Error for VerifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Malformed(err) => Some(err),
            Self::UpstreamStatus(_) => None,
        }
    }
}

pub struct Verifier {
    client: Client,
    config: VerifierConfig,
}

impl Verifier {
    /// Build a verifier from the given config, the `timeout` caps the whole
    /// outbound exchange.
    pub fn new(config: VerifierConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(crate::turngate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Ask the siteverify endpoint for a verdict on `token`.
    ///
    /// The secret only travels in the request body and never reaches a log
    /// line; the span deliberately skips all fields.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<VerifyVerdict, VerifierError> {
        let payload = json!({
            "secret": self.config.secret.expose_secret(),
            "response": token,
        });

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(VerifierError::Transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(VerifierError::Transport)?;

        if !status.is_success() {
            return Err(VerifierError::UpstreamStatus(status));
        }

        let verdict: VerifyVerdict =
            serde_json::from_slice(&body).map_err(VerifierError::Malformed)?;

        debug!(success = verdict.success, "siteverify verdict");

        Ok(verdict)
    }
}
