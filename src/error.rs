//! Structured error types for careerdoc.
//!
//! Each module owns a small error enum for the failures it can produce.
//! `CareerDocError` wraps them for the public API and the CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::model::catalog::CatalogError;
use crate::table::BuildError;
use crate::telemetry::TelemetryError;
use crate::template::TemplateError;

/// The unified error type returned by all public careerdoc API functions.
#[derive(Debug, Error)]
pub enum CareerDocError {
    /// JSON input failed to parse as a request, AI content block or catalog.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The domain catalog is malformed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Domain selection was rejected in strict validation mode.
    #[error("Domain selection error: {0}")]
    Build(#[from] BuildError),

    /// The request failed upstream validation (name, domain count).
    #[error("Invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The language-model response reported an error instead of content.
    #[error("AI content error: {0}")]
    AiContent(String),

    /// Page layout received a value it cannot place.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// The header image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The page template could not be read or merged.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for CareerDocError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CareerDocError::ParseError { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err: CareerDocError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = CareerDocError::Validation(vec![
            "Name is required".to_string(),
            "Select at least one domain".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid request: Name is required; Select at least one domain"
        );
    }
}
