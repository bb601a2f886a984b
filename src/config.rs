//! Runtime configuration from the environment (and an optional `.env`).

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::layout::OverflowPolicy;
use crate::table::DomainValidation;

/// Top-level configuration for the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Alternate domain catalog; the built-in one is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub header_image: PathBuf,
    /// PDF whose third page is drawn under the last generated page.
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub domain_validation: DomainValidation,
    pub overflow: OverflowPolicy,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CAREERDOC_DOMAIN_VALIDATION must be 'lenient' or 'strict', got '{0}'")]
    InvalidDomainValidation(String),
    #[error("CAREERDOC_OVERFLOW must be 'overflow' or 'new-page', got '{0}'")]
    InvalidOverflow(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            header_image: PathBuf::from("assets/header.png"),
            template_path: PathBuf::from("assets/template.pdf"),
            output_dir: PathBuf::from("output"),
            domain_validation: DomainValidation::Lenient,
            overflow: OverflowPolicy::Overflow,
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read `CAREERDOC_*` variables without touching `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let catalog_path = env::var("CAREERDOC_CATALOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let header_image = env::var("CAREERDOC_HEADER_IMAGE")
            .map(PathBuf::from)
            .unwrap_or(defaults.header_image);
        let template_path = env::var("CAREERDOC_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or(defaults.template_path);
        let output_dir = env::var("CAREERDOC_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let domain_validation = match env::var("CAREERDOC_DOMAIN_VALIDATION") {
            Ok(value) => parse_domain_validation(&value)?,
            Err(_) => defaults.domain_validation,
        };
        let overflow = match env::var("CAREERDOC_OVERFLOW") {
            Ok(value) => parse_overflow(&value)?,
            Err(_) => defaults.overflow,
        };

        let log_level =
            env::var("CAREERDOC_LOG_LEVEL").unwrap_or_else(|_| defaults.telemetry.log_level);

        Ok(Self {
            catalog_path,
            header_image,
            template_path,
            output_dir,
            domain_validation,
            overflow,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

pub fn parse_domain_validation(value: &str) -> Result<DomainValidation, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lenient" => Ok(DomainValidation::Lenient),
        "strict" => Ok(DomainValidation::Strict),
        _ => Err(ConfigError::InvalidDomainValidation(value.to_string())),
    }
}

pub fn parse_overflow(value: &str) -> Result<OverflowPolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "overflow" => Ok(OverflowPolicy::Overflow),
        "new-page" | "new_page" | "newpage" => Ok(OverflowPolicy::NewPage),
        _ => Err(ConfigError::InvalidOverflow(value.to_string())),
    }
}
