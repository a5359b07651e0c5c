//! Configuration validation for the Vista core.
//!
//! Provides validation logic for configuration fields to ensure
//! all required values are present and within valid ranges.

use thiserror::Error;

use crate::config::{Config, ObservabilityConfig, ScreeningConfig, ValuationConfig};

/// Log levels accepted by the logging setup.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Log formats accepted by the logging setup.
pub const LOG_FORMATS: &[&str] = &["json", "pretty"];

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Collapse a list of errors into a single result.
    pub fn from_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let errors: Vec<ValidationError> = [
            self.observability.validate(),
            self.screening.validate(),
            self.valuation.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        ValidationError::from_errors(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!(
                    "'{}' is not one of {}",
                    self.log_level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("'{}' is not one of json, pretty", self.log_format),
            });
        }

        Ok(())
    }
}

impl Validate for ScreeningConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.page_size == 0 {
            return Err(ValidationError::InvalidValue {
                field: "screening.page_size".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.debounce_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "screening.debounce_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ValuationConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.forecast_period.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "valuation.forecast_period".into(),
            });
        }
        if !self.ebitda_unit.is_finite() || self.ebitda_unit <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "valuation.ebitda_unit".into(),
                reason: format!("{} must be a positive number", self.ebitda_unit),
            });
        }
        Ok(())
    }
}
