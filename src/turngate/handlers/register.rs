use crate::turngate::credentials::{CredentialChecker, RegisterDecision};
use crate::turngate::handlers::{
    challenge_gate, error_response, CredentialRequest, MSG_REGISTER_OK, MSG_USERNAME_TAKEN,
};
use crate::turnstile::Verifier;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialRequest,
    responses(
        (status = 200, description = "Registration successful", content_type = "application/json"),
        (status = 400, description = "Malformed request or challenge verification failed"),
        (status = 409, description = "User with the specified username already exists"),
        (status = 500, description = "Verification service error"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(verifier): Extension<Arc<Verifier>>,
    Extension(checker): Extension<Arc<dyn CredentialChecker>>,
    payload: Option<Json<CredentialRequest>>,
) -> Response {
    let request = match challenge_gate(&verifier, payload).await {
        Ok(request) => request,
        Err(outcome) => return outcome.into_response(),
    };

    debug!("Registration attempt for {}", request.username);

    match checker.register(&request.username, &request.password) {
        RegisterDecision::Accepted => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": MSG_REGISTER_OK })),
        )
            .into_response(),
        RegisterDecision::Rejected => error_response(StatusCode::CONFLICT, MSG_USERNAME_TAKEN),
    }
}
