//! Row shapes as the store returns them (snake_case), plus the
//! conversions into the application entities. The mapping lives here and
//! nowhere else.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{Investor, Meeting, Metrics, Startup, StartupStatus};

#[derive(Debug, Clone, FromRow)]
pub struct StartupRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub sector: String,
    pub status: String,
    pub logo_url: Option<String>,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub health_justification: Option<String>,
    pub health_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MetricsRow {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub revenue: f64,
    pub cash_balance: f64,
    pub ebitda_or_burn: f64,
    pub headcount: i32,
    pub highlights: Option<String>,
    pub next_steps: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MeetingRow {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct InvestorRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

/// Minimal projection for the public form (no financials exposed).
#[derive(Debug, Clone, FromRow)]
pub struct StartupPublicRow {
    pub id: Uuid,
    pub name: String,
    pub sector: String,
}

impl TryFrom<StartupRow> for Startup {
    type Error = anyhow::Error;

    fn try_from(row: StartupRow) -> Result<Self> {
        let status = StartupStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("invalid status '{}' for startup {}", row.status, row.id))?;

        Ok(Startup {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            sector: row.sector,
            status,
            logo_url: row.logo_url,
            contact_email: row.contact_email,
            created_at: row.created_at,
            health_justification: row.health_justification,
            health_updated_at: row.health_updated_at,
        })
    }
}

impl From<MetricsRow> for Metrics {
    fn from(row: MetricsRow) -> Self {
        Metrics {
            id: row.id,
            startup_id: row.startup_id,
            month: row.month,
            year: row.year,
            revenue: row.revenue,
            cash_balance: row.cash_balance,
            ebitda_or_burn: row.ebitda_or_burn,
            headcount: row.headcount,
            highlights: row.highlights,
            next_steps: row.next_steps,
            created_at: row.created_at,
        }
    }
}

impl From<MeetingRow> for Meeting {
    fn from(row: MeetingRow) -> Self {
        Meeting {
            id: row.id,
            startup_id: row.startup_id,
            date: row.date,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

impl From<InvestorRow> for Investor {
    fn from(row: InvestorRow) -> Self {
        Investor {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            display_name: row.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> StartupRow {
        StartupRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Acme".to_string(),
            sector: "Fintech".to_string(),
            status: status.to_string(),
            logo_url: None,
            contact_email: "founder@acme.com".to_string(),
            created_at: Utc::now(),
            health_justification: None,
            health_updated_at: None,
        }
    }

    #[test]
    fn startup_row_converts_known_status() {
        let startup = Startup::try_from(row("attention")).unwrap();
        assert_eq!(startup.status, StartupStatus::Attention);
    }

    #[test]
    fn startup_row_rejects_unknown_status() {
        assert!(Startup::try_from(row("zombie")).is_err());
    }
}
