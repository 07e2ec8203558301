use crate::turngate::credentials::{CredentialChecker, StaticCredentialChecker};
use crate::turnstile::{Verifier, VerifierConfig};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderName, HeaderValue, Method, Request, StatusCode,
    },
    middleware,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub mod credentials;
pub mod handlers;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Maximum accepted request body size, enforced before JSON decoding.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Overall per-request deadline; the verifier exchange gets at most its own
/// configured timeout out of this.
const HANDLER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::login,
        handlers::register::register
    ),
    components(schemas(handlers::CredentialRequest)),
    tags(
        (name = "auth", description = "Turnstile-gated authentication endpoints"),
        (name = "health", description = "Health probe")
    )
)]
struct ApiDoc;

/// Build the application router with the verifier and credential checker
/// injected via extensions so tests stay hermetic.
pub fn router(
    verifier: Arc<Verifier>,
    checker: Arc<dyn CredentialChecker>,
    allowed_origins: &[String],
) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    let app = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CatchPanicLayer::new())
                .layer(middleware::map_response(unify_deadline_response))
                .layer(TimeoutLayer::new(HANDLER_TIMEOUT))
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(Extension(verifier))
                .layer(Extension(checker)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to bind the port or start the server
pub async fn new(port: u16, config: VerifierConfig, allowed_origins: Vec<String>) -> Result<()> {
    let verifier = Arc::new(Verifier::new(config)?);
    let checker: Arc<dyn CredentialChecker> = Arc::new(StaticCredentialChecker::default());

    let app = router(verifier, checker, &allowed_origins)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let mut origins = Vec::with_capacity(allowed_origins.len());

    for origin in allowed_origins {
        let value = origin
            .parse::<HeaderValue>()
            .with_context(|| format!("invalid origin in allowlist: {origin}"))?;
        origins.push(value);
    }

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60)))
}

/// An expired handler deadline surfaces as the timeout layer's 408. Nothing
/// else in the stack produces that status, so rewrite it to the generic
/// verifier-error response the client contract expects.
async fn unify_deadline_response(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return handlers::error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            handlers::MSG_VERIFIER_ERROR,
        );
    }

    response
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Gracefully shutdown");
    }
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
