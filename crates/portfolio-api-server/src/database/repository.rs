use super::models::{InvestorRow, MeetingRow, MetricsRow, StartupPublicRow, StartupRow};
use super::DbPool;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Investor, Meeting, Metrics, MetricsSubmission, Startup, StartupForm, StartupStatus,
};

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All startups owned by an investor, newest first.
    pub async fn list_startups(&self, user_id: Uuid) -> Result<Vec<Startup>> {
        let rows = sqlx::query_as::<_, StartupRow>(
            r#"SELECT
                id, user_id, name, sector, status,
                logo_url, contact_email, created_at,
                health_justification, health_updated_at
               FROM startups
               WHERE user_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(Startup::try_from).collect()
    }

    /// All metrics for an investor's portfolio, ordered (year desc, month
    /// desc). Downstream "latest metric" lookups rely on this ordering.
    pub async fn list_metrics(&self, user_id: Uuid) -> Result<Vec<Metrics>> {
        let rows = sqlx::query_as::<_, MetricsRow>(
            r#"SELECT
                m.id, m.startup_id, m.month, m.year, m.revenue,
                m.cash_balance, m.ebitda_or_burn, m.headcount,
                m.highlights, m.next_steps, m.created_at
               FROM metrics m
               JOIN startups s ON s.id = m.startup_id
               WHERE s.user_id = $1
               ORDER BY m.year DESC, m.month DESC"#,
        )
        .bind(user_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(Metrics::from).collect())
    }

    /// All meetings for an investor's portfolio, newest first.
    pub async fn list_meetings(&self, user_id: Uuid) -> Result<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(
            r#"SELECT
                mt.id, mt.startup_id, mt.date, mt.notes, mt.created_at
               FROM meetings mt
               JOIN startups s ON s.id = mt.startup_id
               WHERE s.user_id = $1
               ORDER BY mt.date DESC"#,
        )
        .bind(user_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(Meeting::from).collect())
    }

    pub async fn find_startup(&self, id: Uuid) -> Result<Option<Startup>> {
        let row = sqlx::query_as::<_, StartupRow>(
            r#"SELECT
                id, user_id, name, sector, status,
                logo_url, contact_email, created_at,
                health_justification, health_updated_at
               FROM startups
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        row.map(Startup::try_from).transpose()
    }

    /// Identity-only lookup for the unauthenticated form route.
    pub async fn find_startup_public(&self, id: Uuid) -> Result<Option<StartupPublicRow>> {
        let row = sqlx::query_as::<_, StartupPublicRow>(
            "SELECT id, name, sector FROM startups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(row)
    }

    pub async fn insert_startup(&self, user_id: Uuid, form: &StartupForm) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO startups (user_id, name, sector, status, logo_url, contact_email)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(user_id)
        .bind(&form.name)
        .bind(&form.sector)
        .bind(form.status.as_str())
        .bind(&form.logo_url)
        .bind(&form.contact_email)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    pub async fn update_startup(&self, id: Uuid, form: &StartupForm) -> Result<()> {
        sqlx::query(
            r#"UPDATE startups
               SET name = $2, sector = $3, status = $4, logo_url = $5, contact_email = $6
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&form.name)
        .bind(&form.sector)
        .bind(form.status.as_str())
        .bind(&form.logo_url)
        .bind(&form.contact_email)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    /// Dependent metrics and meetings go with it (FK cascade).
    pub async fn delete_startup(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM startups WHERE id = $1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    /// Upsert on (startup_id, month, year): a later submission for the
    /// same period overwrites the earlier one, never errors.
    pub async fn upsert_metrics(&self, submission: &MetricsSubmission) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO metrics
                (startup_id, month, year, revenue, cash_balance,
                 ebitda_or_burn, headcount, highlights, next_steps)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               ON CONFLICT (startup_id, month, year)
               DO UPDATE SET
                 revenue = EXCLUDED.revenue,
                 cash_balance = EXCLUDED.cash_balance,
                 ebitda_or_burn = EXCLUDED.ebitda_or_burn,
                 headcount = EXCLUDED.headcount,
                 highlights = EXCLUDED.highlights,
                 next_steps = EXCLUDED.next_steps"#,
        )
        .bind(submission.startup_id)
        .bind(submission.month)
        .bind(submission.year)
        .bind(submission.revenue)
        .bind(submission.cash_balance)
        .bind(submission.ebitda_or_burn)
        .bind(submission.headcount)
        .bind(&submission.highlights)
        .bind(&submission.next_steps)
        .execute(self.pool.get_pool())
        .await?;

        debug!(
            "Upserted metrics for startup {} ({}/{})",
            submission.startup_id, submission.month, submission.year
        );

        Ok(())
    }

    pub async fn insert_meeting(
        &self,
        startup_id: Uuid,
        date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO meetings (startup_id, date, notes) VALUES ($1, $2, $3)")
            .bind(startup_id)
            .bind(date)
            .bind(notes)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    /// Most recent metric rows for one startup, newest period first.
    pub async fn recent_metrics(&self, startup_id: Uuid, limit: i64) -> Result<Vec<Metrics>> {
        let rows = sqlx::query_as::<_, MetricsRow>(
            r#"SELECT
                id, startup_id, month, year, revenue, cash_balance,
                ebitda_or_burn, headcount, highlights, next_steps, created_at
               FROM metrics
               WHERE startup_id = $1
               ORDER BY year DESC, month DESC
               LIMIT $2"#,
        )
        .bind(startup_id)
        .bind(limit)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(Metrics::from).collect())
    }

    /// Meetings on or after the cutoff date, newest first.
    pub async fn meetings_since(
        &self,
        startup_id: Uuid,
        cutoff: NaiveDate,
    ) -> Result<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(
            r#"SELECT id, startup_id, date, notes, created_at
               FROM meetings
               WHERE startup_id = $1 AND date >= $2
               ORDER BY date DESC"#,
        )
        .bind(startup_id)
        .bind(cutoff)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(Meeting::from).collect())
    }

    /// The only write path for the AI-derived fields.
    pub async fn update_startup_health(
        &self,
        id: Uuid,
        status: StartupStatus,
        justification: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE startups
               SET status = $2, health_justification = $3, health_updated_at = $4
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(justification)
        .bind(updated_at)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    /// Every startup with a non-blank contact address, across all
    /// investors. The reminder job runs portfolio-wide.
    pub async fn startups_with_contact(&self) -> Result<Vec<Startup>> {
        let rows = sqlx::query_as::<_, StartupRow>(
            r#"SELECT
                id, user_id, name, sector, status,
                logo_url, contact_email, created_at,
                health_justification, health_updated_at
               FROM startups
               WHERE contact_email IS NOT NULL AND btrim(contact_email) <> ''
               ORDER BY created_at DESC"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(Startup::try_from).collect()
    }

    pub async fn find_investor_by_email(&self, email: &str) -> Result<Option<Investor>> {
        let row = sqlx::query_as::<_, InvestorRow>(
            "SELECT id, email, password_hash, display_name FROM investors WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(row.map(Investor::from))
    }
}
