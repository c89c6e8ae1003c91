//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración. Todas tienen default de desarrollo salvo DATABASE_URL.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    // Servicio externo de generación de texto
    pub ai_api_url: String,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
}

impl EnvironmentConfig {
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            ai_api_url: env::var("AI_API_URL").unwrap_or_else(|_| {
                "https://api.minimaxi.chat/v1/text/chatcompletion_v2".to_string()
            }),
            ai_api_key: env::var("AI_API_KEY").ok(),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "MiniMax-Text-01".to_string()),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuración fija para tests, sin tocar el entorno del proceso.
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            cors_origins: vec!["*".to_string()],
            ai_api_url: "http://localhost:9/unreachable".to_string(),
            ai_api_key: None,
            ai_model: "test-model".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_has_no_ai_key() {
        let config = EnvironmentConfig::for_tests();
        assert!(config.ai_api_key.is_none());
        assert!(!config.is_development());
        assert_eq!(config.server_url(), "127.0.0.1:0");
    }
}
