use crate::turngate::credentials::CredentialChecker;
use crate::turngate::handlers::{challenge_gate, AuthOutcome, CredentialRequest};
use crate::turnstile::Verifier;
use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialRequest,
    responses(
        (status = 200, description = "Login successful", content_type = "application/json"),
        (status = 400, description = "Malformed request or challenge verification failed"),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Verification service error"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(verifier): Extension<Arc<Verifier>>,
    Extension(checker): Extension<Arc<dyn CredentialChecker>>,
    payload: Option<Json<CredentialRequest>>,
) -> Response {
    let request = match challenge_gate(&verifier, payload).await {
        Ok(request) => request,
        Err(outcome) => return outcome.into_response(),
    };

    debug!("Login attempt for {}", request.username);

    match checker.check(&request.username, &request.password) {
        Some(user) => AuthOutcome::Ok {
            token: user.token,
            username: user.username,
            role: user.role,
        }
        .into_response(),
        None => AuthOutcome::BadCredentials.into_response(),
    }
}
