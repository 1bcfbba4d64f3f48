//! server::auth
//!
//! Bearer secret check for the upload endpoint.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::error::AppError;
use super::AppState;

/// Compare a presented `Authorization` header against the configured secret.
///
/// Both sides are hashed first, so the comparison time does not depend on
/// where the inputs first differ.
pub fn bearer_matches(header: Option<&str>, secret: &str) -> bool {
    let Some(presented) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return false;
    };
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(secret.as_bytes());
    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Middleware rejecting requests without the configured bearer secret.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if !bearer_matches(header, &state.incoming_secret) {
        warn!(uri = %request.uri(), "rejected upload with invalid authorization token");
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}
