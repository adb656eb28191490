// src/error.rs
//! Unified error handling for vent-core
//!
//! Every subsystem defines its own error enum close to the code that raises
//! it (template loading, model scaling, recorded-stream parsing,
//! configuration). All of them convert into [`VentError`] so callers can
//! propagate a single type with `?` across the whole analysis pipeline.

use std::error::Error;
use std::fmt;

use crate::config::loader::ConfigError;
use crate::model::template::TemplateError;
use crate::model::waveform::ModelError;
use crate::source::recorded::SourceError;

/// Unified error type for the vent-core pipeline.
///
/// Degraded-detection conditions are *not* errors: contour analysis always
/// produces a record and reports anomalies as warning flags on the record
/// itself (see [`crate::analysis::contour::ContourWarning`]).
#[derive(Debug)]
pub enum VentError {
    /// Waveform template loading or parsing failed (fatal at startup).
    Template(TemplateError),
    /// Waveform model scaling or sampling failed.
    Model(ModelError),
    /// Recorded sample stream could not be read.
    Source(SourceError),
    /// Configuration file loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for VentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VentError::Template(err) => write!(f, "[TEMPLATE] {}", err),
            VentError::Model(err) => write!(f, "[MODEL] {}", err),
            VentError::Source(err) => write!(f, "[SOURCE] {}", err),
            VentError::Config(err) => write!(f, "[CONFIG] {}", err),
        }
    }
}

impl Error for VentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VentError::Template(err) => Some(err),
            VentError::Model(err) => Some(err),
            VentError::Source(err) => Some(err),
            VentError::Config(err) => Some(err),
        }
    }
}

impl From<TemplateError> for VentError {
    fn from(err: TemplateError) -> Self {
        VentError::Template(err)
    }
}

impl From<ModelError> for VentError {
    fn from(err: ModelError) -> Self {
        VentError::Model(err)
    }
}

impl From<SourceError> for VentError {
    fn from(err: SourceError) -> Self {
        VentError::Source(err)
    }
}

impl From<ConfigError> for VentError {
    fn from(err: ConfigError) -> Self {
        VentError::Config(err)
    }
}

/// Result type alias for vent-core operations
pub type VentResult<T> = Result<T, VentError>;
