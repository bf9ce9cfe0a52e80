use axum::{extract::Extension, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Claims;
use crate::domain::{Metrics, Startup};
use crate::portfolio::{analytics, PortfolioAnalytics, PortfolioStore};
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupOverview {
    #[serde(flatten)]
    pub startup: Startup,
    /// `None` when the startup never reported; the client renders a
    /// placeholder instead of a value.
    pub latest_metrics: Option<Metrics>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub startups: Vec<StartupOverview>,
    /// Omitted (null) for an empty portfolio.
    pub analytics: Option<PortfolioAnalytics>,
}

pub async fn dashboard_handler(
    Extension(store): Extension<Arc<PortfolioStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let user_id = claims.investor_id()?;
    let snapshot = store.snapshot(user_id).await?;

    let analytics = analytics::compute(&snapshot, Utc::now());

    let startups = snapshot
        .startups
        .iter()
        .map(|s| StartupOverview {
            latest_metrics: snapshot.latest_metrics(s.id).cloned(),
            startup: s.clone(),
        })
        .collect();

    Ok(Json(DashboardResponse {
        startups,
        analytics,
    }))
}
