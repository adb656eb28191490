// src/utils/mod.rs
//! Utility functions shared across vent-core

pub mod interp;
pub mod scan;
pub mod validation;

pub use interp::interp_pressure;
pub use validation::{ValidationError, ValidationResult};
