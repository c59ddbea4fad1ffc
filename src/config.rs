use serde::Deserialize;
use std::env;
use url::Url;

use crate::api::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Bounds connection establishment only; requests themselves are never timed out
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder()
            .set_default("server.base_url", "http://127.0.0.1:5000")?
            .set_default("http.connect_timeout_secs", 10)?
            .set_default(
                "http.user_agent",
                concat!("db-explorer/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")?;

        // Load from environment variables
        if let Ok(base_url) = env::var("EXPLORER_API_URL") {
            builder = builder.set_override("server.base_url", base_url)?;
        }

        if let Ok(timeout) = env::var("EXPLORER_CONNECT_TIMEOUT") {
            builder = builder.set_override(
                "http.connect_timeout_secs",
                timeout.parse::<u64>().unwrap_or(10),
            )?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Base URL with a trailing slash so relative endpoint paths append to it
    pub fn api_base(&self) -> Result<Url, AppError> {
        let mut base = self.server.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        // Clear environment variables for this test
        env::remove_var("EXPLORER_API_URL");
        env::remove_var("EXPLORER_CONNECT_TIMEOUT");

        let config = Config::from_env();
        assert!(config.is_ok());

        let config = config.unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert!(config.http.user_agent.starts_with("db-explorer/"));
    }

    #[test]
    fn test_api_base_gets_trailing_slash() {
        let config = Config {
            server: ServerConfig {
                base_url: "http://localhost:5000/app".to_string(),
            },
            http: HttpConfig {
                connect_timeout_secs: 10,
                user_agent: "test".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                style: "auto".to_string(),
            },
        };

        assert_eq!(config.api_base().unwrap().as_str(), "http://localhost:5000/app/");
    }
}
