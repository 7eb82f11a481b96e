//! Error type definitions for the XMLTV grabber
//!
//! Configuration and output failures are fatal and travel up to `main`.
//! Source failures are recovered per channel by the orchestrator.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (unreadable or invalid config/channel files)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Filesystem errors, including failure to write the guide
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Upstream provider errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Non-success HTTP status from the provider
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Provider answered with an empty body
    #[error("Empty response for channel {channel}")]
    EmptyResponse { channel: String },

    /// Response body could not be parsed
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// Channel descriptor lacks what the provider needs
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a parse error for the given source type
    pub fn parse<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Map a reqwest failure onto the source taxonomy
    pub fn from_request(error: reqwest::Error, url: &str) -> Self {
        if error.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        match error.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
                message: error.to_string(),
            },
            None => Self::Http {
                status: 0,
                message: error.to_string(),
            },
        }
    }
}
