use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::auth::AuthError;
use crate::error::AppError;

/// Resolve the bearer credential against the identity provider before any
/// wallet logic runs, and hand the authenticated user to the handler via
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).to_string())
        .ok_or_else(|| AppError::Unauthorized("No authorization header".to_string()))?;

    let user = state.verifier.verify(&token).await.map_err(|e| match e {
        AuthError::MissingToken | AuthError::InvalidToken => {
            AppError::Unauthorized("Invalid user token".to_string())
        }
        other => AppError::Internal(other.to_string()),
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
