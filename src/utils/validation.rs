// src/utils/validation.rs
//! Validation utilities for vent-core
//!
//! Validation functions use constants from the config module to avoid magic
//! numbers and keep range checks consistent across components.

use std::fmt;

use crate::config::constants::{detection, simulation};

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of valid range
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    /// Cross-field validation failure
    ConstraintViolation {
        fields: Vec<String>,
        message: String,
    },
    /// Custom validation failure
    Custom(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange { field, value, min, max } => {
                write!(f, "Field '{}' value '{}' is out of range [{}, {}]", field, value, min, max)
            }
            ValidationError::ConstraintViolation { fields, message } => {
                write!(f, "Constraint violation for fields [{}]: {}", fields.join(", "), message)
            }
            ValidationError::Custom(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a breaths-per-minute rate
pub fn validate_bpm(bpm: f64) -> ValidationResult<()> {
    if !bpm.is_finite() || bpm < simulation::MIN_BPM || bpm > simulation::MAX_BPM {
        return Err(ValidationError::OutOfRange {
            field: "bpm".to_string(),
            value: bpm.to_string(),
            min: simulation::MIN_BPM.to_string(),
            max: simulation::MAX_BPM.to_string(),
        });
    }
    Ok(())
}

/// Validate the peak/PEEP pair. The detector never resolves a plateau when
/// `peak <= peep`, so the pair is rejected before any samples are produced.
pub fn validate_pressure_pair(peak: f64, peep: f64) -> ValidationResult<()> {
    if !peak.is_finite() || !peep.is_finite() || peak <= peep {
        return Err(ValidationError::ConstraintViolation {
            fields: vec!["peak".to_string(), "peep".to_string()],
            message: format!("peak ({}) must exceed peep ({})", peak, peep),
        });
    }
    Ok(())
}

/// Validate a threshold factor for cycle detection
pub fn validate_threshold_factor(factor: f64) -> ValidationResult<()> {
    if !factor.is_finite()
        || factor < detection::MIN_THRESHOLD_FACTOR
        || factor > detection::MAX_THRESHOLD_FACTOR
    {
        return Err(ValidationError::OutOfRange {
            field: "threshold_factor".to_string(),
            value: factor.to_string(),
            min: detection::MIN_THRESHOLD_FACTOR.to_string(),
            max: detection::MAX_THRESHOLD_FACTOR.to_string(),
        });
    }
    Ok(())
}

/// Validate a jitter percentage (bounded to keep jittered configs scalable)
pub fn validate_jitter_pct(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=50.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: pct.to_string(),
            min: "0".to_string(),
            max: "50".to_string(),
        });
    }
    Ok(())
}
