//! Health analysis job endpoint. Triggered by the metrics change hook;
//! the hook owns retry policy, this handler runs once.

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::Repository;
use crate::services::analysis::{build_meetings_context, build_metrics_context};
use crate::services::AnalysisService;
use crate::utils::error::ApiError;

/// The change hook posts the inserted row as `{record: {...}}`; manual
/// invocations send a bare `{startup_id}`.
#[derive(Debug, Deserialize)]
pub struct AnalyzePayload {
    #[serde(default)]
    pub record: Option<RecordRef>,
    #[serde(default)]
    pub startup_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RecordRef {
    #[serde(default)]
    pub startup_id: Option<Uuid>,
}

impl AnalyzePayload {
    pub fn startup_id(&self) -> Option<Uuid> {
        self.record
            .as_ref()
            .and_then(|r| r.startup_id)
            .or(self.startup_id)
    }
}

pub async fn analyze_health_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(analysis_service): Extension<Arc<AnalysisService>>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<Response, ApiError> {
    let startup_id = payload.startup_id().ok_or_else(|| {
        ApiError::BadRequest("startup_id não encontrado no payload".to_string())
    })?;

    let recent_metrics = repository
        .recent_metrics(startup_id, 3)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    // Nothing reported yet: a successful no-op, not an error.
    if recent_metrics.is_empty() {
        return Ok(Json(serde_json::json!({
            "skipped": "sem métricas disponíveis"
        }))
        .into_response());
    }

    let cutoff = (Utc::now() - Duration::days(90)).date_naive();
    let recent_meetings = repository
        .meetings_since(startup_id, cutoff)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let startup = repository
        .find_startup(startup_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| {
            ApiError::InternalError(format!("Startup {} não encontrada", startup_id))
        })?;

    let metrics_context = build_metrics_context(&recent_metrics);
    let meetings_context = build_meetings_context(&recent_meetings);

    let analysis = analysis_service
        .analyze(
            &startup.name,
            &startup.sector,
            &metrics_context,
            &meetings_context,
        )
        .await?;

    repository
        .update_startup_health(startup_id, analysis.status, &analysis.justification, Utc::now())
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(
        "Health analysis for startup {}: {}",
        startup_id, analysis.status
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "startupId": startup_id,
        "analysis": analysis,
    }))
    .into_response())
}
