//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::ai_service::{AiAnalysisService, TextGenerationClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub http_client: Client,
    pub ai_service: Arc<dyn AiAnalysisService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let http_client = Client::new();
        let ai_service = Arc::new(TextGenerationClient::new(http_client.clone(), &config));
        Self {
            pool,
            config,
            http_client,
            ai_service,
        }
    }
}
