// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Keyword pattern compilation failed
    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The render context could not be acquired
    #[error("Renderer startup failed: {0}")]
    Render(String),

    /// Language model request failed
    #[error("LLM error: {0}")]
    Llm(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a renderer startup error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Create a language model error.
    pub fn llm(message: impl fmt::Display) -> Self {
        Self::Llm(message.to_string())
    }
}

/// Failure to load a single page.
///
/// Never aborts a crawl: the controller logs it and moves on to the next
/// frontier entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out after {timeout:?} loading {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unsupported content type '{content_type}' at {url}")]
    Unsupported { url: String, content_type: String },

    #[error("network error loading {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classify a transport error for `url`.
    pub fn from_reqwest(url: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_error_message() {
        let err = AppError::selector("[[bad", "unexpected token");
        assert_eq!(
            err.to_string(),
            "Invalid selector '[[bad': unexpected token"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://a.com/x".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "https://a.com/x answered with HTTP 503");
    }
}
