// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Lecture de la configuration depuis les variables d'environnement
//   (fichier .env chargé au démarrage par dotenv).
//
// Variables:
//   - APP_ENV : development | test | production (défaut: development)
//   - APP_HOST / APP_PORT : adresse d'écoute (défaut: 127.0.0.1:8080)
//   - DATABASE_URL : obligatoire
//   - JWT_SECRET : obligatoire hors développement
//   - JWT_TTL_HOURS : durée de vie des sessions (défaut: 24)
//   - APP_BASE_URL : base des liens envoyés par email
//   - APP_LOG_LEVEL : filtre tracing si RUST_LOG absent (défaut: info)
//   - MAIL_API_URL / MAIL_API_KEY / MAIL_SENDER_EMAIL / MAIL_SENDER_NAME
//
// ============================================================================

use std::env;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";
const DEFAULT_MAIL_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Base des liens publics, ex: https://inmobiliaria.example
    pub app_base_url: String,
    pub log_level: String,
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

impl AppConfig {
    /// Charge le .env puis lit les variables du processus
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    /// (les tests passent une map au lieu de modifier l'environnement)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = AppEnvironment::parse(&read("APP_ENV").unwrap_or_default());

        let host = read("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match read("APP_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "APP_PORT",
                value,
            })?,
            None => 8080,
        };

        let database_url = read("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = match read("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            None => DEFAULT_JWT_SECRET.to_string(),
        };

        let jwt_ttl_hours = match read("JWT_TTL_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "JWT_TTL_HOURS",
                        value,
                    });
                }
            },
            None => 24,
        };

        let app_base_url = read("APP_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let log_level = read("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        // L'envoi d'emails n'est actif que si la clé et l'expéditeur sont présents
        let mail = match (read("MAIL_API_KEY"), read("MAIL_SENDER_EMAIL")) {
            (Some(api_key), Some(sender_email)) => Some(MailConfig {
                api_url: read("MAIL_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
                api_key,
                sender_email,
                sender_name: read("MAIL_SENDER_NAME"),
            }),
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            database_url,
            auth: AuthConfig {
                jwt_secret,
                jwt_ttl_hours,
            },
            app_base_url,
            log_level,
            mail,
        })
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
