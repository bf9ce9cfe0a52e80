use axum::{extract::Extension, Json};
use std::sync::Arc;

use crate::auth::Claims;
use crate::domain::MetricsSubmission;
use crate::portfolio::PortfolioStore;
use crate::utils::error::ApiError;

use super::startups::MutationResponse;

/// Investor-side upsert; same (startup, month, year) contract as the
/// public form.
pub async fn submit_metrics_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
    Json(submission): Json<MetricsSubmission>,
) -> Result<Json<MutationResponse>, ApiError> {
    let user_id = claims.investor_id()?;

    let snapshot = store.snapshot(user_id).await?;
    if !snapshot
        .startups
        .iter()
        .any(|s| s.id == submission.startup_id)
    {
        return Err(ApiError::NotFound("Startup não encontrada".to_string()));
    }

    store.submit_metrics(user_id, &submission).await?;

    Ok(Json(MutationResponse { success: true }))
}
