use axum::{extract::Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Claims;
use crate::portfolio::PortfolioStore;
use crate::utils::error::ApiError;

use super::startups::MutationResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub startup_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Append-only: the UI exposes no edit or delete path for meetings.
pub async fn add_meeting_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<MeetingRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let user_id = claims.investor_id()?;

    let snapshot = store.snapshot(user_id).await?;
    if !snapshot
        .startups
        .iter()
        .any(|s| s.id == request.startup_id)
    {
        return Err(ApiError::NotFound("Startup não encontrada".to_string()));
    }

    store
        .add_meeting(
            user_id,
            request.startup_id,
            request.date,
            request.notes.as_deref(),
        )
        .await?;

    Ok(Json(MutationResponse { success: true }))
}
