//! Dashboard aggregates, recomputed from the cached snapshot on demand.
//! Never persisted.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use super::store::PortfolioSnapshot;
use crate::domain::StartupStatus;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalytics {
    /// Sum of each startup's most recent reported revenue.
    pub total_revenue: f64,
    pub healthy_pct: i64,
    pub attention_pct: i64,
    pub critical_pct: i64,
    /// Share of startups with a metric for the current calendar month.
    pub responded_pct: i64,
    /// Share of startups with a board meeting in the trailing 90 days.
    pub routines_pct: i64,
}

fn pct(count: usize, total: usize) -> i64 {
    ((count as f64 / total as f64) * 100.0).round() as i64
}

/// `None` when the portfolio is empty — the aggregate block is omitted
/// entirely rather than dividing by zero.
pub fn compute(snapshot: &PortfolioSnapshot, now: DateTime<Utc>) -> Option<PortfolioAnalytics> {
    let total = snapshot.startups.len();
    if total == 0 {
        return None;
    }

    let total_revenue = snapshot
        .startups
        .iter()
        .map(|s| {
            snapshot
                .latest_metrics(s.id)
                .map(|m| m.revenue)
                .unwrap_or(0.0)
        })
        .sum();

    let count_status = |status: StartupStatus| {
        snapshot
            .startups
            .iter()
            .filter(|s| s.status == status)
            .count()
    };

    let cur_month = now.month() as i32;
    let cur_year = now.year();
    let responded = snapshot
        .startups
        .iter()
        .filter(|s| {
            snapshot
                .metrics
                .iter()
                .any(|m| m.startup_id == s.id && m.month == cur_month && m.year == cur_year)
        })
        .count();

    let ninety_days_ago = (now - Duration::days(90)).date_naive();
    let routines_ok = snapshot
        .startups
        .iter()
        .filter(|s| {
            snapshot
                .meetings
                .iter()
                .any(|m| m.startup_id == s.id && m.date >= ninety_days_ago)
        })
        .count();

    Some(PortfolioAnalytics {
        total_revenue,
        healthy_pct: pct(count_status(StartupStatus::Healthy), total),
        attention_pct: pct(count_status(StartupStatus::Attention), total),
        critical_pct: pct(count_status(StartupStatus::Critical), total),
        responded_pct: pct(responded, total),
        routines_pct: pct(routines_ok, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Meeting, Metrics, Startup};
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn startup(status: StartupStatus) -> Startup {
        Startup {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Acme".to_string(),
            sector: "SaaS".to_string(),
            status,
            logo_url: None,
            contact_email: "f@acme.com".to_string(),
            created_at: Utc::now(),
            health_justification: None,
            health_updated_at: None,
        }
    }

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

    fn meeting(startup_id: Uuid, date: NaiveDate) -> Meeting {
        Meeting {
            id: Uuid::new_v4(),
            startup_id,
            date,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_portfolio_omits_aggregates() {
        let snapshot = PortfolioSnapshot::default();
        assert!(compute(&snapshot, Utc::now()).is_none());
    }

    #[test]
    fn status_distribution_rounds_to_50_25_25() {
        let snapshot = PortfolioSnapshot {
            startups: vec![
                startup(StartupStatus::Healthy),
                startup(StartupStatus::Healthy),
                startup(StartupStatus::Attention),
                startup(StartupStatus::Critical),
            ],
            metrics: vec![],
            meetings: vec![],
        };

        let analytics = compute(&snapshot, Utc::now()).unwrap();
        assert_eq!(analytics.healthy_pct, 50);
        assert_eq!(analytics.attention_pct, 25);
        assert_eq!(analytics.critical_pct, 25);
        assert_eq!(
            analytics.healthy_pct + analytics.attention_pct + analytics.critical_pct,
            100
        );
    }

    #[test]
    fn total_revenue_uses_latest_metric_and_zero_for_missing() {
        let a = startup(StartupStatus::Healthy);
        let b = startup(StartupStatus::Healthy);
        let snapshot = PortfolioSnapshot {
            startups: vec![a.clone(), b.clone()],
            // a reported twice; only the newest month counts. b never reported.
            metrics: vec![metrics(a.id, 2, 2026, 800.0), metrics(a.id, 1, 2026, 300.0)],
            meetings: vec![],
        };

        let analytics = compute(&snapshot, Utc::now()).unwrap();
        assert_eq!(analytics.total_revenue, 800.0);
    }

    #[test]
    fn responded_pct_counts_current_month_only() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let a = startup(StartupStatus::Healthy);
        let b = startup(StartupStatus::Healthy);
        let snapshot = PortfolioSnapshot {
            startups: vec![a.clone(), b.clone()],
            metrics: vec![
                metrics(a.id, 8, 2026, 100.0),
                // previous month does not count as responded
                metrics(b.id, 7, 2026, 100.0),
            ],
            meetings: vec![],
        };

        let analytics = compute(&snapshot, now).unwrap();
        assert_eq!(analytics.responded_pct, 50);
    }

    #[test]
    fn routines_pct_uses_trailing_90_day_window() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let recent = now.date_naive() - chrono::Duration::days(30);
        let stale = now.date_naive() - chrono::Duration::days(120);

        let a = startup(StartupStatus::Healthy);
        let b = startup(StartupStatus::Healthy);
        let snapshot = PortfolioSnapshot {
            startups: vec![a.clone(), b.clone()],
            metrics: vec![],
            meetings: vec![meeting(a.id, recent), meeting(b.id, stale)],
        };

        let analytics = compute(&snapshot, now).unwrap();
        assert_eq!(analytics.routines_pct, 50);
    }
}
