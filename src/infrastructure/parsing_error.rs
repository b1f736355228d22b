//! Parsing error types
//!
//! Markup-shape problems never surface as errors; extraction degrades to
//! sentinel text instead. These variants cover configuration problems found
//! while the parsers are being built.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector {
        selector: String,
        reason: String,
        alternatives: Vec<String>,
    },

    #[error("No usable selector configured for {field}")]
    NoUsableSelector { field: String, tried: Vec<String> },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    /// Create an invalid selector error with alternatives
    pub fn invalid_selector(selector: &str, reason: &str, alternatives: Vec<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
            alternatives,
        }
    }

    pub fn no_usable_selector(field: &str, tried: &[String]) -> Self {
        Self::NoUsableSelector {
            field: field.to_string(),
            tried: tried.to_vec(),
        }
    }

    pub fn url_resolution_failed(url: &str, reason: &str, base_url: Option<&str>) -> Self {
        Self::UrlResolutionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            base_url: base_url.map(str::to_string),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidSelector { .. } => true,
            Self::UrlResolutionFailed { .. } => true,
            Self::NoUsableSelector { .. } => false,
            Self::ConfigurationError { .. } => false,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
