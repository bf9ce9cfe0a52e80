use axum::{
    extract::{Extension, Request},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::jwt::JwtManager;
use crate::utils::error::ApiError;

/// Bearer guard for the investor routes. A missing or invalid token is
/// the API counterpart of the SPA's redirect-to-login.
pub async fn require_auth(
    Extension(jwt): Extension<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt
        .validate_token(token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
