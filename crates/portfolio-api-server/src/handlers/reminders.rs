//! Monthly reminder job endpoint. Invoked on a schedule; emails every
//! startup with a contact address a link to the public form. Sends run
//! sequentially, and one rejected recipient never aborts the rest.

use axum::{
    extract::Extension,
    http::{header, HeaderMap},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::database::Repository;
use crate::services::email::SendOutcome;
use crate::services::EmailService;
use crate::utils::error::ApiError;
use crate::utils::format::month_label;

#[derive(Debug, Serialize)]
pub struct ReminderSummary {
    pub sent: usize,
    pub results: Vec<ReminderResult>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResult {
    pub startup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn outcome_result(
    startup: &str,
    email: &str,
    outcome: Result<SendOutcome, ApiError>,
) -> ReminderResult {
    match outcome {
        Ok(sent) => ReminderResult {
            startup: startup.to_string(),
            email: Some(email.to_string()),
            status: Some(sent.status),
            data: Some(sent.data),
            error: None,
        },
        Err(e) => ReminderResult {
            startup: startup.to_string(),
            email: None,
            status: None,
            data: None,
            error: Some(e.to_string()),
        },
    }
}

pub async fn send_monthly_forms_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(email_service): Extension<Arc<EmailService>>,
    Extension(settings): Extension<Settings>,
    headers: HeaderMap,
) -> Result<Json<ReminderSummary>, ApiError> {
    // Scheduler shared secret; skipped when none is configured.
    let secret = settings.app.cron_secret.trim();
    if !secret.is_empty() {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", secret))
            .unwrap_or(false);
        if !authorized {
            return Err(ApiError::Unauthorized("Unauthorized".to_string()));
        }
    }

    let startups = repository
        .startups_with_contact()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let now = Utc::now();
    let month_name = month_label(now.month(), now.year());
    let subject = format!("📊 Report Mensal – {}", month_name);

    let mut results = Vec::with_capacity(startups.len());

    for startup in &startups {
        let form_url = format!("{}/forms/{}", settings.app.public_url, startup.id);

        let outcome = match email_service.render_monthly_report(
            &startup.name,
            &month_name,
            &form_url,
        ) {
            Ok(html) => {
                email_service
                    .send(&startup.contact_email, &subject, &html)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!("Reminder for '{}' failed: {}", startup.name, e);
        }

        results.push(outcome_result(
            &startup.name,
            &startup.contact_email,
            outcome,
        ));
    }

    info!("Reminder cycle finished: {} attempts", results.len());

    Ok(Json(ReminderSummary {
        sent: results.len(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_send_records_status_and_body() {
        let result = outcome_result(
            "Acme",
            "founder@acme.com",
            Ok(SendOutcome {
                status: 200,
                data: json!({"id": "email_1"}),
            }),
        );

        assert_eq!(result.startup, "Acme");
        assert_eq!(result.email.as_deref(), Some("founder@acme.com"));
        assert_eq!(result.status, Some(200));
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_send_records_error_distinctly() {
        let result = outcome_result(
            "Acme",
            "founder@acme.com",
            Err(ApiError::EmailError("connection refused".to_string())),
        );

        assert_eq!(result.startup, "Acme");
        assert!(result.status.is_none());
        assert!(result.error.as_deref().unwrap().contains("connection refused"));
    }

    #[test]
    fn one_failure_leaves_other_outcomes_intact() {
        // Mirrors a cycle where the second recipient's transport fails.
        let outcomes = vec![
            outcome_result(
                "Alpha",
                "a@alpha.com",
                Ok(SendOutcome {
                    status: 200,
                    data: Value::Null,
                }),
            ),
            outcome_result(
                "Beta",
                "b@beta.com",
                Err(ApiError::EmailError("timeout".to_string())),
            ),
            outcome_result(
                "Gamma",
                "c@gamma.com",
                Ok(SendOutcome {
                    status: 200,
                    data: Value::Null,
                }),
            ),
        ];

        let summary = ReminderSummary {
            sent: outcomes.len(),
            results: outcomes,
        };

        assert_eq!(summary.sent, 3);
        assert_eq!(
            summary
                .results
                .iter()
                .filter(|r| r.status == Some(200))
                .count(),
            2
        );
        let failed: Vec<_> = summary
            .results
            .iter()
            .filter(|r| r.error.is_some())
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].startup, "Beta");
    }
}
