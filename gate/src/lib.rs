//! HTTP gate that admits requests carrying a valid locked token.
//!
//! The verify endpoint reports the three-way result for diagnostics. The
//! protected routes collapse every non-valid outcome and every error into a
//! plain 401.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use sessionlock::{
    FreshnessWindow, LockTimestamp, ParsedToken, SessionLockError, TokenVerifier,
    ValidationResult, VerifierConfig,
};
use tracing::{debug, warn};

/// Listener and verifier settings for the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub host: String,
    pub port: u16,
    pub verifier: VerifierConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4003,
            verifier: VerifierConfig::default(),
        }
    }
}

impl GateConfig {
    /// `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerifyRequest {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_window_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerifyResponse {
    pub result: ValidationResult,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProtectedResponse {
    pub status: String,
    pub public_key: String,
    pub client_timestamp: LockTimestamp,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

async fn verify_handler(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected verify request body");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let window = request
        .freshness_window_ms
        .map(FreshnessWindow::from_millis)
        .unwrap_or(state.verifier.config().freshness_window);

    match state.verifier.verify_with_window(&request.token, window).await {
        Ok(result) => Json(VerifyResponse { result }).into_response(),
        Err(e @ SessionLockError::MalformedToken(_)) => {
            debug!(error = %e, "Rejected malformed token");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            warn!(error = %e, "Token verification failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Admits the request only if its bearer credential is a valid locked
/// token, and hands the parsed token to the inner handler.
async fn require_locked_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    };

    match state.verifier.authorize(token).await {
        Ok(parsed) => {
            request.extensions_mut().insert(parsed);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "Denied request");
            error_response(StatusCode::UNAUTHORIZED, "unauthorized")
        }
    }
}

async fn protected_handler(Extension(token): Extension<ParsedToken>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        status: "authorized".to_string(),
        public_key: token.public_key,
        client_timestamp: token.timestamp,
    })
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Build the HTTP API router with the given verifier state.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/protected", get(protected_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_locked_token,
        ));

    Router::new()
        .route("/api/v1/verify", post(verify_handler))
        .route("/api/v1/health", get(health_handler))
        .merge(protected)
        .with_state(state)
}
