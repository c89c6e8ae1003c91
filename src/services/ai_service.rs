//! Cliente del servicio externo de generación de texto
//!
//! Tratado como una caja negra prompt-in/JSON-out para los resúmenes
//! narrativos de los reportes. Opcional: sin API key configurada el
//! endpoint responde 503.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::environment::EnvironmentConfig;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait AiAnalysisService: Send + Sync {
    async fn generate_narrative(&self, prompt: &str) -> AppResult<String>;
}

/// Cliente HTTP contra un endpoint estilo chat-completion.
pub struct TextGenerationClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl TextGenerationClient {
    pub fn new(http: reqwest::Client, config: &EnvironmentConfig) -> Self {
        Self {
            http,
            api_url: config.ai_api_url.clone(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
        }
    }
}

#[async_trait]
impl AiAnalysisService for TextGenerationClient {
    async fn generate_narrative(&self, prompt: &str) -> AppResult<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("AI narrative service is not configured".to_string())
        })?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "text generation endpoint returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ExternalApi("unexpected response shape from text generation".to_string())
            })
    }
}

/// Prompt para el resumen narrativo del ROI.
pub fn roi_narrative_prompt(summary: &crate::dto::insights_dto::RoiSummary) -> String {
    format!(
        "You are a fleet management analyst. Summarize the following savings \
         analysis for a city bus fleet in 3 short paragraphs for an operations \
         manager. Period: {}. Fuel waste: ${} potential savings. Empty buses: \
         ${}. Driver habits: ${}. Maintenance: ${}. Route optimization: ${}. \
         Total potential annual savings: ${} against a first-year system cost \
         of ${} (ROI {}%, payback {} months).",
        summary.period,
        summary.fuel_waste.potential_annual_savings.round_dp(2),
        summary.empty_buses.potential_annual_savings.round_dp(2),
        summary.driver_habits.potential_annual_savings.round_dp(2),
        summary.maintenance_surprises.potential_annual_savings.round_dp(2),
        summary.inefficient_routes.potential_annual_savings.round_dp(2),
        summary.total_potential_annual_savings.round_dp(2),
        summary.system_cost_year_1,
        summary.roi_percentage.round_dp(1),
        summary.payback_months.round_dp(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_is_unavailable() {
        let config = EnvironmentConfig {
            ai_api_key: None,
            ..EnvironmentConfig::for_tests()
        };
        let client = TextGenerationClient::new(reqwest::Client::new(), &config);
        let err = client.generate_narrative("hello").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }
}
