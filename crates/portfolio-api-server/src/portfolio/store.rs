//! Process-local cache of an investor's portfolio. Every mutation does
//! the remote write and then refetches the entire dataset; there is no
//! optimistic or incremental update. A failed write surfaces the error
//! and leaves the previous snapshot untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::database::Repository;
use crate::domain::{Meeting, Metrics, MetricsSubmission, Startup, StartupForm};
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct PortfolioSnapshot {
    pub startups: Vec<Startup>,
    /// Sorted (year desc, month desc) at fetch time.
    pub metrics: Vec<Metrics>,
    /// Sorted by date desc at fetch time.
    pub meetings: Vec<Meeting>,
}

impl PortfolioSnapshot {
    /// First match in the desc-sorted collection, i.e. the most recent
    /// reported month. `None` when the startup never reported.
    pub fn latest_metrics(&self, startup_id: Uuid) -> Option<&Metrics> {
        self.metrics.iter().find(|m| m.startup_id == startup_id)
    }

    pub fn startup_metrics(&self, startup_id: Uuid) -> Vec<&Metrics> {
        self.metrics
            .iter()
            .filter(|m| m.startup_id == startup_id)
            .collect()
    }

    pub fn startup_meetings(&self, startup_id: Uuid) -> Vec<&Meeting> {
        self.meetings
            .iter()
            .filter(|m| m.startup_id == startup_id)
            .collect()
    }
}

pub struct PortfolioStore {
    repository: Arc<Repository>,
    cache: RwLock<HashMap<Uuid, PortfolioSnapshot>>,
}

impl PortfolioStore {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached snapshot for an investor, loading it on first access.
    pub async fn snapshot(&self, user_id: Uuid) -> Result<PortfolioSnapshot, ApiError> {
        if let Some(snapshot) = self.cache.read().await.get(&user_id) {
            return Ok(snapshot.clone());
        }
        self.refresh(user_id).await
    }

    /// Refetch all three collections and replace the cached snapshot.
    pub async fn refresh(&self, user_id: Uuid) -> Result<PortfolioSnapshot, ApiError> {
        let startups = self
            .repository
            .list_startups(user_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let metrics = self
            .repository
            .list_metrics(user_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let meetings = self
            .repository
            .list_meetings(user_id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let snapshot = PortfolioSnapshot {
            startups,
            metrics,
            meetings,
        };

        debug!(
            "Refreshed portfolio for investor {}: {} startups, {} metrics, {} meetings",
            user_id,
            snapshot.startups.len(),
            snapshot.metrics.len(),
            snapshot.meetings.len()
        );

        self.cache.write().await.insert(user_id, snapshot.clone());
        Ok(snapshot)
    }

    pub async fn add_startup(&self, user_id: Uuid, form: &StartupForm) -> Result<(), ApiError> {
        self.repository
            .insert_startup(user_id, form)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        self.refresh(user_id).await?;
        Ok(())
    }

    pub async fn update_startup(
        &self,
        user_id: Uuid,
        id: Uuid,
        form: &StartupForm,
    ) -> Result<(), ApiError> {
        self.repository
            .update_startup(id, form)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        self.refresh(user_id).await?;
        Ok(())
    }

    pub async fn delete_startup(&self, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        self.repository
            .delete_startup(id)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        self.refresh(user_id).await?;
        Ok(())
    }

    pub async fn submit_metrics(
        &self,
        user_id: Uuid,
        submission: &MetricsSubmission,
    ) -> Result<(), ApiError> {
        self.repository
            .upsert_metrics(submission)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        self.refresh(user_id).await?;
        Ok(())
    }

    pub async fn add_meeting(
        &self,
        user_id: Uuid,
        startup_id: Uuid,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<(), ApiError> {
        self.repository
            .insert_meeting(startup_id, date, notes)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        self.refresh(user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StartupStatus;
    use chrono::Utc;

    fn metrics(startup_id: Uuid, month: i32, year: i32, revenue: f64) -> Metrics {
        Metrics {
            id: Uuid::new_v4(),
            startup_id,
            month,
            year,
            revenue,
            cash_balance: 0.0,
            ebitda_or_burn: 0.0,
            headcount: 0,
            highlights: None,
            next_steps: None,
            created_at: Utc::now(),
        }
    }

    fn startup(id: Uuid) -> Startup {
        Startup {
            id,
            user_id: Uuid::new_v4(),
            name: "Acme".to_string(),
            sector: "SaaS".to_string(),
            status: StartupStatus::Healthy,
            logo_url: None,
            contact_email: "f@acme.com".to_string(),
            created_at: Utc::now(),
            health_justification: None,
            health_updated_at: None,
        }
    }

    #[test]
    fn latest_metrics_is_first_match_in_sorted_order() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let snapshot = PortfolioSnapshot {
            startups: vec![startup(id), startup(other)],
            // fetch order: (2026, 2), (2026, 1), (2025, 12)
            metrics: vec![
                metrics(other, 2, 2026, 900.0),
                metrics(id, 1, 2026, 500.0),
                metrics(id, 12, 2025, 400.0),
            ],
            meetings: vec![],
        };

        let latest = snapshot.latest_metrics(id).unwrap();
        assert_eq!((latest.month, latest.year), (1, 2026));
        assert_eq!(latest.revenue, 500.0);
    }

    #[test]
    fn latest_metrics_none_for_unreported_startup() {
        let id = Uuid::new_v4();
        let snapshot = PortfolioSnapshot {
            startups: vec![startup(id)],
            metrics: vec![],
            meetings: vec![],
        };

        assert!(snapshot.latest_metrics(id).is_none());
    }

    #[test]
    fn startup_metrics_filter_preserves_order() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let snapshot = PortfolioSnapshot {
            startups: vec![],
            metrics: vec![
                metrics(id, 2, 2026, 1.0),
                metrics(other, 2, 2026, 2.0),
                metrics(id, 1, 2026, 3.0),
            ],
            meetings: vec![],
        };

        let timeline = snapshot.startup_metrics(id);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].month, 2);
        assert_eq!(timeline[1].month, 1);
    }
}
