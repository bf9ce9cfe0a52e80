use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::Settings;
use crate::domain::{Meeting, Metrics, Startup, StartupForm};
use crate::portfolio::PortfolioStore;
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupDetailResponse {
    pub startup: Startup,
    /// Timeline, newest period first.
    pub metrics: Vec<Metrics>,
    pub meetings: Vec<Meeting>,
    /// Public submission link the investor can copy for the founder.
    pub form_url: String,
}

fn validate_form(form: &StartupForm) -> Result<(), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Nome é obrigatório".to_string()));
    }
    if form.sector.trim().is_empty() {
        return Err(ApiError::BadRequest("Setor é obrigatório".to_string()));
    }
    if form.contact_email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "E-mail de contato é obrigatório".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_startup_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
    Json(form): Json<StartupForm>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let user_id = claims.investor_id()?;
    validate_form(&form)?;

    store.add_startup(user_id, &form).await?;
    info!("Investor {} added startup '{}'", user_id, form.name);

    Ok((StatusCode::CREATED, Json(MutationResponse { success: true })))
}

pub async fn update_startup_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(form): Json<StartupForm>,
) -> Result<Json<MutationResponse>, ApiError> {
    let user_id = claims.investor_id()?;
    validate_form(&form)?;
    require_owned(&store, user_id, id).await?;

    store.update_startup(user_id, id, &form).await?;

    Ok(Json(MutationResponse { success: true }))
}

pub async fn delete_startup_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MutationResponse>, ApiError> {
    let user_id = claims.investor_id()?;
    require_owned(&store, user_id, id).await?;

    store.delete_startup(user_id, id).await?;
    info!("Investor {} removed startup {}", user_id, id);

    Ok(Json(MutationResponse { success: true }))
}

pub async fn startup_detail_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(settings): Extension<Settings>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<StartupDetailResponse>, ApiError> {
    let user_id = claims.investor_id()?;
    let snapshot = store.snapshot(user_id).await?;

    let startup = snapshot
        .startups
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Startup não encontrada".to_string()))?;

    let metrics = snapshot
        .startup_metrics(id)
        .into_iter()
        .cloned()
        .collect();
    let meetings = snapshot
        .startup_meetings(id)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(StartupDetailResponse {
        startup,
        metrics,
        meetings,
        form_url: format!("{}/forms/{}", settings.app.public_url, id),
    }))
}

/// Ownership gate: an id outside the investor's portfolio is a miss,
/// not someone else's row.
async fn require_owned(
    store: &PortfolioStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    let snapshot = store.snapshot(user_id).await?;
    if snapshot.startups.iter().any(|s| s.id == id) {
        Ok(())
    } else {
        Err(ApiError::NotFound("Startup não encontrada".to_string()))
    }
}
