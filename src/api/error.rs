use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Remote(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure taxonomy surfaced to the status region
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LocalValidation,
    Transport,
    RemoteReported,
    MalformedSuccess,
    Configuration,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::LocalValidation,
            AppError::Transport(_) => ErrorKind::Transport,
            AppError::Remote(_) => ErrorKind::RemoteReported,
            AppError::MalformedResponse(_) => ErrorKind::MalformedSuccess,
            AppError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the failure happened before anything was sent over the wire
    pub fn is_local(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::Config(_))
    }

    /// Message suitable for the status region
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Transport(msg) => {
                // Connection problems get an actionable hint
                if msg.contains("connect") || msg.contains("dns") {
                    format!("Network error occurred: {}. Check that the explorer server is running.", msg)
                } else {
                    format!("Network error occurred: {}", msg)
                }
            }
            AppError::Remote(msg) => msg.clone(),
            AppError::MalformedResponse(msg) => format!("Unexpected response from server: {}", msg),
            AppError::Config(msg) => format!("Configuration error: {}", msg),
        }
    }
}

/// Convert reqwest::Error to AppError
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            AppError::Transport(format!("could not connect to server ({})", err))
        } else if err.is_timeout() {
            AppError::Transport(format!("timed out waiting for server ({})", err))
        } else if err.is_decode() {
            AppError::Transport(format!("malformed response body: {}", err))
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("invalid URL: {}", err))
    }
}
