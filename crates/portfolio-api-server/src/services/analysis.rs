//! Health analysis client: assembles the metrics/meetings context,
//! calls the Anthropic Messages API once, and validates the structured
//! output against the closed status set.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::settings::AiConfig;
use crate::domain::{Meeting, Metrics, StartupStatus};
use crate::utils::error::ApiError;
use crate::utils::format::{format_brl, long_date_label, month_label};

const SYSTEM_PROMPT: &str = "Você é um analista especializado em venture capital brasileiro. \
Sua função é avaliar a saúde de startups do portfólio com base em dados financeiros e \
observações de reuniões de conselho.

Você deve retornar APENAS um JSON válido, sem markdown, sem explicação extra. O formato é:
{
  \"status\": \"healthy\" | \"attention\" | \"critical\",
  \"justification\": \"string em português, máximo 3 frases, objetiva e direta\"
}

Critérios para status:
- \"healthy\": crescimento de receita, caixa saudável (>6 meses de runway), EBITDA positivo ou burn controlado, time estável
- \"attention\": sinais mistos — receita estagnada ou leve queda, caixa entre 3-6 meses de runway, burn acima do planejado, ou alertas nas notas de reunião
- \"critical\": queda acentuada de receita, caixa < 3 meses de runway, burn elevado e crescente, ou problemas graves relatados em reuniões";

#[derive(Clone)]
pub struct AnalysisService {
    client: Client,
    config: AiConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    pub status: StartupStatus,
    pub justification: String,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<MessageParam>,
}

#[derive(Serialize)]
struct MessageParam {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct RawAnalysis {
    status: String,
    justification: String,
}

impl AnalysisService {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    pub async fn analyze(
        &self,
        name: &str,
        sector: &str,
        metrics_context: &str,
        meetings_context: &str,
    ) -> Result<HealthAnalysis, ApiError> {
        let user_prompt = format!(
            "Analise a saúde da startup abaixo e retorne o JSON de avaliação.\n\n\
             ## Startup\nNome: {}\nSetor: {}\n\n\
             ## Métricas dos últimos 3 meses\n{}\n\n\
             ## Notas das reuniões de conselho (últimos 90 dias)\n{}\n\n\
             Retorne apenas o JSON, sem nenhum texto adicional.",
            name, sector, metrics_context, meetings_context
        );

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: user_prompt,
            }],
        };

        debug!("Requesting health analysis for startup '{}'", name);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::AiError(format!("Anthropic network error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::AiError(format!(
                "Anthropic API error ({}): {}",
                status, body
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AiError(format!("Failed to parse Anthropic response: {}", e)))?;

        let text = body
            .content
            .first()
            .map(|block| block.text.as_str())
            .unwrap_or("");

        parse_analysis(text)
    }
}

/// Strict output contract: valid JSON with the two fields and a status
/// inside the enum. Anything else is invalid AI output for this run.
pub fn parse_analysis(text: &str) -> Result<HealthAnalysis, ApiError> {
    let raw: RawAnalysis = serde_json::from_str(text.trim())
        .map_err(|_| ApiError::AiError(format!("JSON inválido retornado pela IA: {}", text)))?;

    let status = StartupStatus::parse(&raw.status)
        .ok_or_else(|| ApiError::AiError("status inválido retornado pela IA".to_string()))?;

    Ok(HealthAnalysis {
        status,
        justification: raw.justification,
    })
}

/// One block per month; the newest entry is flagged as the most recent.
pub fn build_metrics_context(rows: &[Metrics]) -> String {
    rows.iter()
        .enumerate()
        .map(|(i, m)| {
            let label = if i == 0 {
                format!("Mês mais recente ({})", month_label(m.month as u32, m.year))
            } else {
                month_label(m.month as u32, m.year)
            };

            let burn_line = if m.ebitda_or_burn < 0.0 {
                format!("Burn: R$ {}", format_brl(m.ebitda_or_burn.abs()))
            } else {
                format!("EBITDA: R$ {}", format_brl(m.ebitda_or_burn))
            };

            let mut lines = vec![
                format!("### {}", label),
                format!("- Receita: R$ {}", format_brl(m.revenue)),
                format!("- Saldo em caixa: R$ {}", format_brl(m.cash_balance)),
                format!("- {}", burn_line),
                format!("- Headcount: {}", m.headcount),
            ];
            if let Some(highlights) = &m.highlights {
                lines.push(format!("- Destaques: {}", highlights));
            }
            if let Some(next_steps) = &m.next_steps {
                lines.push(format!("- Próximos passos: {}", next_steps));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_meetings_context(rows: &[Meeting]) -> String {
    if rows.is_empty() {
        return "Nenhuma reunião de conselho registrada nos últimos 90 dias.".to_string();
    }
    rows.iter()
        .map(|m| {
            format!(
                "- {}: {}",
                long_date_label(m.date),
                m.notes.as_deref().unwrap_or("(sem notas registradas)")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn metrics(
        month: i32,
        year: i32,
        revenue: f64,
        ebitda_or_burn: f64,
        highlights: Option<&str>,
    ) -> Metrics {
        Metrics {
            id: Uuid::new_v4(),
            startup_id: Uuid::new_v4(),
            month,
            year,
            revenue,
            cash_balance: 120_000.0,
            ebitda_or_burn,
            headcount: 12,
            highlights: highlights.map(String::from),
            next_steps: None,
            created_at: Utc::now(),
        }
    }

    fn meeting(date: NaiveDate, notes: Option<&str>) -> Meeting {
        Meeting {
            id: Uuid::new_v4(),
            startup_id: Uuid::new_v4(),
            date,
            notes: notes.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parse_analysis_accepts_valid_payload() {
        let analysis =
            parse_analysis(r#"{"status": "critical", "justification": "Caixa para 2 meses."}"#)
                .unwrap();
        assert_eq!(analysis.status, StartupStatus::Critical);
        assert_eq!(analysis.justification, "Caixa para 2 meses.");
    }

    #[test]
    fn parse_analysis_tolerates_surrounding_whitespace() {
        let analysis =
            parse_analysis("\n  {\"status\": \"healthy\", \"justification\": \"ok\"}  \n").unwrap();
        assert_eq!(analysis.status, StartupStatus::Healthy);
    }

    #[test]
    fn parse_analysis_rejects_unknown_status() {
        let err = parse_analysis(r#"{"status": "unknown", "justification": "x"}"#).unwrap_err();
        match err {
            ApiError::AiError(msg) => assert!(msg.contains("status inválido")),
            other => panic!("expected AiError, got {:?}", other),
        }
    }

    #[test]
    fn parse_analysis_rejects_non_json() {
        let err = parse_analysis("A startup parece saudável.").unwrap_err();
        match err {
            ApiError::AiError(msg) => assert!(msg.contains("JSON inválido")),
            other => panic!("expected AiError, got {:?}", other),
        }
    }

    #[test]
    fn metrics_context_labels_burn_with_absolute_value() {
        let context = build_metrics_context(&[metrics(6, 2026, 80_000.0, -45_000.0, None)]);
        assert!(context.contains("Mês mais recente (junho de 2026)"));
        assert!(context.contains("- Burn: R$ 45.000"));
        assert!(!context.contains("-45"));
    }

    #[test]
    fn metrics_context_labels_ebitda_when_non_negative() {
        let context = build_metrics_context(&[metrics(5, 2026, 80_000.0, 10_000.0, None)]);
        assert!(context.contains("- EBITDA: R$ 10.000"));

        let zero = build_metrics_context(&[metrics(5, 2026, 80_000.0, 0.0, None)]);
        assert!(zero.contains("- EBITDA: R$ 0"));
    }

    #[test]
    fn metrics_context_only_first_month_flagged_recent() {
        let context = build_metrics_context(&[
            metrics(6, 2026, 1.0, 0.0, Some("Fechou contrato âncora")),
            metrics(5, 2026, 1.0, 0.0, None),
        ]);
        assert_eq!(context.matches("Mês mais recente").count(), 1);
        assert!(context.contains("### maio de 2026"));
        assert!(context.contains("- Destaques: Fechou contrato âncora"));
    }

    #[test]
    fn meetings_context_placeholder_when_empty() {
        assert_eq!(
            build_meetings_context(&[]),
            "Nenhuma reunião de conselho registrada nos últimos 90 dias."
        );
    }

    #[test]
    fn meetings_context_lists_dates_and_notes() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        let context = build_meetings_context(&[
            meeting(date, Some("Discussão sobre runway")),
            meeting(date, None),
        ]);
        assert!(context.contains("- 15 de julho de 2026: Discussão sobre runway"));
        assert!(context.contains("(sem notas registradas)"));
    }
}
