//! Public report-submission form. Unauthenticated by design: founders
//! reach it through the emailed link.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::Repository;
use crate::domain::MetricsSubmission;
use crate::utils::error::ApiError;
use crate::utils::format::month_label;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContextResponse {
    pub startup: FormStartup,
    pub month: i32,
    pub year: i32,
    pub month_label: String,
}

#[derive(Debug, Serialize)]
pub struct FormStartup {
    pub id: Uuid,
    pub name: String,
    pub sector: String,
}

/// Expected outcome of a stale or mistyped link, not a server fault.
fn invalid_link() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "invalidLink": true,
            "message": "Este link de formulário não existe."
        })),
    )
        .into_response()
}

pub async fn form_context_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Path(startup_id): Path<String>,
) -> Result<Response, ApiError> {
    // A malformed id behaves like an unknown one.
    let Ok(id) = Uuid::parse_str(&startup_id) else {
        return Ok(invalid_link());
    };

    let Some(startup) = repository
        .find_startup_public(id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
    else {
        return Ok(invalid_link());
    };

    let now = Utc::now();
    let month = now.month() as i32;
    let year = now.year();

    Ok(Json(FormContextResponse {
        startup: FormStartup {
            id: startup.id,
            name: startup.name,
            sector: startup.sector,
        },
        month,
        year,
        month_label: month_label(month as u32, year),
    })
    .into_response())
}

/// Numeric fields arrive as free text from the form; malformed input
/// never blocks submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSubmission {
    #[serde(default)]
    pub revenue: Value,
    #[serde(default)]
    pub cash_balance: Value,
    #[serde(default)]
    pub ebitda_or_burn: Value,
    #[serde(default)]
    pub headcount: Value,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
}

fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn lenient_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0) as i32,
        Value::String(s) => s.trim().parse::<f64>().map(|f| f as i32).unwrap_or(0),
        _ => 0,
    }
}

pub async fn submit_form_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Path(startup_id): Path<String>,
    Json(form): Json<PublicSubmission>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&startup_id) else {
        return invalid_link();
    };

    let startup = match repository.find_startup_public(id).await {
        Ok(Some(startup)) => startup,
        Ok(None) => return invalid_link(),
        Err(e) => {
            error!("Failed to resolve form startup {}: {}", id, e);
            return submit_failed();
        }
    };

    let now = Utc::now();
    let submission = MetricsSubmission {
        startup_id: id,
        month: now.month() as i32,
        year: now.year(),
        revenue: lenient_f64(&form.revenue),
        cash_balance: lenient_f64(&form.cash_balance),
        ebitda_or_burn: lenient_f64(&form.ebitda_or_burn),
        headcount: lenient_i32(&form.headcount),
        highlights: form.highlights,
        next_steps: form.next_steps,
    };

    if let Err(e) = repository.upsert_metrics(&submission).await {
        error!("Failed to store report for startup {}: {}", id, e);
        return submit_failed();
    }

    info!(
        "Report received for startup {} ({}/{})",
        id, submission.month, submission.year
    );

    Json(serde_json::json!({
        "success": true,
        "message": "Enviado com sucesso!",
        "startup": startup.name,
        "monthLabel": month_label(submission.month as u32, submission.year),
    }))
    .into_response()
}

/// Generic retry message; the form stays resubmittable.
fn submit_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Erro ao enviar. Tente novamente."
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_f64_coerces_garbage_to_zero() {
        assert_eq!(lenient_f64(&json!("abc")), 0.0);
        assert_eq!(lenient_f64(&json!(null)), 0.0);
        assert_eq!(lenient_f64(&json!({})), 0.0);
        assert_eq!(lenient_f64(&json!("")), 0.0);
    }

    #[test]
    fn lenient_f64_accepts_numbers_and_numeric_strings() {
        assert_eq!(lenient_f64(&json!(1500.5)), 1500.5);
        assert_eq!(lenient_f64(&json!("1500.5")), 1500.5);
        assert_eq!(lenient_f64(&json!(" 42 ")), 42.0);
        assert_eq!(lenient_f64(&json!("-300")), -300.0);
    }

    #[test]
    fn lenient_i32_truncates_and_coerces() {
        assert_eq!(lenient_i32(&json!(12)), 12);
        assert_eq!(lenient_i32(&json!("12")), 12);
        assert_eq!(lenient_i32(&json!("12.7")), 12);
        assert_eq!(lenient_i32(&json!("twelve")), 0);
        assert_eq!(lenient_i32(&json!(null)), 0);
    }

    #[test]
    fn submission_deserializes_with_all_fields_missing() {
        let form: PublicSubmission = serde_json::from_str("{}").unwrap();
        assert_eq!(lenient_f64(&form.revenue), 0.0);
        assert_eq!(lenient_i32(&form.headcount), 0);
        assert!(form.highlights.is_none());
    }
}
