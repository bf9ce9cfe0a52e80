//! Reminder email: handlebars-rendered HTML dispatched one request per
//! recipient through the provider's HTTP send API. A rejected send is a
//! per-recipient outcome, never fatal to the batch.

use anyhow::Result;
use handlebars::Handlebars;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::settings::EmailConfig;
use crate::utils::error::ApiError;

const MONTHLY_REPORT_TEMPLATE: &str = include_str!("../../templates/monthly_report.hbs");

pub struct EmailService {
    client: Client,
    config: EmailConfig,
    registry: Handlebars<'static>,
}

/// Provider response captured per recipient: HTTP status plus whatever
/// body the send API returned.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub status: u16,
    pub data: Value,
}

#[derive(Serialize)]
struct SendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string("monthly_report", MONTHLY_REPORT_TEMPLATE)?;

        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
            registry,
        })
    }

    pub fn render_monthly_report(
        &self,
        startup_name: &str,
        month_label: &str,
        form_url: &str,
    ) -> Result<String, ApiError> {
        self.registry
            .render(
                "monthly_report",
                &json!({
                    "name": startup_name,
                    "month_label": month_label,
                    "form_url": form_url,
                }),
            )
            .map_err(|e| ApiError::EmailError(format!("Template render failed: {}", e)))
    }

    /// One request per recipient. A non-2xx provider status is returned
    /// in the outcome, not as an error; only transport failure errors.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<SendOutcome, ApiError> {
        let request = SendRequest {
            from: self.config.sender.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::EmailError(format!("Email network error: {}", e)))?;

        let status = response.status().as_u16();
        let data = response.json::<Value>().await.unwrap_or(Value::Null);

        debug!("Email to {} returned status {}", to, status);

        Ok(SendOutcome { status, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::EmailConfig;

    fn service() -> EmailService {
        EmailService::new(EmailConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.resend.com".to_string(),
            sender: "Portfolio VC <no-reply@seudominio.com>".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn template_embeds_name_month_and_link() {
        let html = service()
            .render_monthly_report(
                "Acme Fintech",
                "agosto de 2026",
                "https://portfolio.example/forms/abc-123",
            )
            .unwrap();

        assert!(html.contains("Acme Fintech"));
        assert!(html.contains("agosto de 2026"));
        assert!(html.contains("https://portfolio.example/forms/abc-123"));
        assert!(html.contains("Report Mensal"));
    }

    #[test]
    fn template_escapes_html_in_startup_name() {
        let html = service()
            .render_monthly_report("<script>x</script>", "agosto de 2026", "https://x/forms/1")
            .unwrap();
        assert!(!html.contains("<script>x</script>"));
    }
}
