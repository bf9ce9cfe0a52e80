//! In-memory entity shapes. The snake_case row structs stay inside the
//! database layer; everything above it works with these types, serialized
//! camelCase over the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Three-way health classification. Closed set: the database column, the
/// AI output contract, and the dashboard badge all go through this enum,
/// so an unrecognized value is rejected at the boundary instead of
/// leaking into views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupStatus {
    Healthy,
    Attention,
    Critical,
}

impl StartupStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "healthy" => Some(Self::Healthy),
            "attention" => Some(Self::Attention),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Attention => "attention",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for StartupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Startup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub sector: String,
    pub status: StartupStatus,
    pub logo_url: Option<String>,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub health_justification: Option<String>,
    pub health_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub revenue: f64,
    pub cash_balance: f64,
    /// Negative = burn, positive = EBITDA.
    pub ebitda_or_burn: f64,
    pub headcount: i32,
    pub highlights: Option<String>,
    pub next_steps: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Investor {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

/// Investor-side create/update payload for a startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupForm {
    pub name: String,
    pub sector: String,
    pub status: StartupStatus,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub contact_email: String,
}

/// One month's figures, keyed by (startup, month, year). A resubmission
/// for the same key overwrites the earlier row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSubmission {
    pub startup_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub revenue: f64,
    pub cash_balance: f64,
    pub ebitda_or_burn: f64,
    pub headcount: i32,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
}
