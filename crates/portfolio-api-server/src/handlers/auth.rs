use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::JwtManager;
use crate::database::Repository;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub investor: InvestorInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorInfo {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}

pub async fn login_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(jwt): Extension<Arc<JwtManager>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Same message for unknown email and wrong password.
    let invalid = || ApiError::Unauthorized("Credenciais inválidas".to_string());

    let investor = repository
        .find_investor_by_email(&request.email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&investor.password_hash).map_err(|_| invalid())?;
    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    let token = jwt
        .generate_token(investor.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    info!("Investor {} signed in", investor.id);

    Ok(Json(LoginResponse {
        token,
        investor: InvestorInfo {
            id: investor.id,
            email: investor.email,
            display_name: investor.display_name,
        },
    }))
}
