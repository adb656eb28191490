// src/config/mod.rs
//! Configuration management for vent-core

pub mod constants;
pub mod loader;

pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};

use crate::utils::validation::{
    validate_bpm, validate_jitter_pct, validate_pressure_pair, validate_threshold_factor,
    ValidationResult,
};

/// Target scaling for the waveform model.
///
/// The first non-regenerate scale call captures this as the model baseline,
/// which later jittered re-scales draw around without replacing.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    /// Breaths per minute
    #[serde(default = "defaults::bpm")]
    pub bpm: f64,

    /// Peak inspiratory pressure, cm H2O
    #[serde(default = "defaults::peak")]
    pub peak: f64,

    /// Positive end-expiratory pressure floor, cm H2O
    #[serde(default = "defaults::peep")]
    pub peep: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            bpm: defaults::bpm(),
            peak: defaults::peak(),
            peep: defaults::peep(),
        }
    }
}

impl ScaleConfig {
    /// Create a scale config from explicit targets
    pub fn new(bpm: f64, peak: f64, peep: f64) -> Self {
        Self { bpm, peak, peep }
    }

    /// Validate rate and pressure targets before any samples are produced
    pub fn validate(&self) -> ValidationResult<()> {
        validate_bpm(self.bpm)?;
        validate_pressure_pair(self.peak, self.peep)?;
        Ok(())
    }
}

/// Per-cycle random variation, expressed as ± percentages of the baseline
/// scale config.
///
/// The `bpm` percentage is part of the surface but ignored by the model:
/// rate jitter desynchronizes sample spacing and introduces artifacts.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct JitterPct {
    /// Rate variation percentage (accepted, currently ignored)
    #[serde(default)]
    pub bpm: f64,

    /// Peak pressure variation percentage
    #[serde(default)]
    pub peak: f64,

    /// PEEP variation percentage
    #[serde(default)]
    pub peep: f64,
}

impl JitterPct {
    /// Validate jitter percentages
    pub fn validate(&self) -> ValidationResult<()> {
        validate_jitter_pct("jitter.bpm", self.bpm)?;
        validate_jitter_pct("jitter.peak", self.peak)?;
        validate_jitter_pct("jitter.peep", self.peep)?;
        Ok(())
    }
}

/// Cycle detection and contour bracketing tunables
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Explicit trigger threshold, cm H2O. When unset the threshold is
    /// recomputed per analysis pass as `buffer minimum * threshold_factor`;
    /// pinning it avoids recomputation drift between passes.
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Multiplier applied to the observed pressure floor
    #[serde(default = "defaults::threshold_factor")]
    pub threshold_factor: f64,

    /// Divisor of the peak slope marking where the contour flattens
    #[serde(default = "defaults::slope_factor")]
    pub slope_factor: f64,

    /// Seconds skipped past the rise peak before the exhalation search
    #[serde(default = "defaults::skip_margin_secs")]
    pub skip_margin_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            threshold_factor: defaults::threshold_factor(),
            slope_factor: defaults::slope_factor(),
            skip_margin_secs: defaults::skip_margin_secs(),
        }
    }
}

impl DetectionConfig {
    /// Validate detection tunables
    pub fn validate(&self) -> ValidationResult<()> {
        validate_threshold_factor(self.threshold_factor)?;
        if self.slope_factor < constants::contour::MIN_SLOPE_FACTOR {
            return Err(crate::utils::ValidationError::OutOfRange {
                field: "slope_factor".to_string(),
                value: self.slope_factor.to_string(),
                min: constants::contour::MIN_SLOPE_FACTOR.to_string(),
                max: "inf".to_string(),
            });
        }
        if !self.skip_margin_secs.is_finite() || self.skip_margin_secs < 0.0 {
            return Err(crate::utils::ValidationError::OutOfRange {
                field: "skip_margin_secs".to_string(),
                value: self.skip_margin_secs.to_string(),
                min: "0".to_string(),
                max: "inf".to_string(),
            });
        }
        Ok(())
    }
}

/// Simulation settings for synthesized sensor streams
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Target scaling for the breath model
    #[serde(default)]
    pub scale: ScaleConfig,

    /// Seconds between synthesized samples
    #[serde(default = "defaults::sample_period_secs")]
    pub sample_period_secs: f64,

    /// Optional per-cycle randomized re-scaling
    #[serde(default)]
    pub jitter: Option<JitterPct>,

    /// Seed for the jitter random source; fixes simulation runs for replay
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            sample_period_secs: defaults::sample_period_secs(),
            jitter: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate simulation settings
    pub fn validate(&self) -> ValidationResult<()> {
        self.scale.validate()?;
        if let Some(jitter) = &self.jitter {
            jitter.validate()?;
        }
        if !self.sample_period_secs.is_finite() || self.sample_period_secs <= 0.0 {
            return Err(crate::utils::ValidationError::OutOfRange {
                field: "sample_period_secs".to_string(),
                value: self.sample_period_secs.to_string(),
                min: "> 0".to_string(),
                max: "inf".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete monitoring configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct MonitorConfig {
    /// Waveform synthesis settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Cycle detection settings
    #[serde(default)]
    pub detection: DetectionConfig,
}

impl MonitorConfig {
    /// Validate the whole configuration, failing fast on the first problem
    pub fn validate(&self) -> ValidationResult<()> {
        self.simulation.validate()?;
        self.detection.validate()?;
        Ok(())
    }
}

/// Default value providers using constants
mod defaults {
    use super::constants::{contour, detection, simulation};

    pub fn bpm() -> f64 {
        simulation::DEFAULT_BPM
    }

    pub fn peak() -> f64 {
        simulation::DEFAULT_PEAK_CM_H2O
    }

    pub fn peep() -> f64 {
        simulation::DEFAULT_PEEP_CM_H2O
    }

    pub fn sample_period_secs() -> f64 {
        simulation::DEFAULT_SAMPLE_PERIOD_SECS
    }

    pub fn threshold_factor() -> f64 {
        detection::DEFAULT_THRESHOLD_FACTOR
    }

    pub fn slope_factor() -> f64 {
        contour::DEFAULT_SLOPE_FACTOR
    }

    pub fn skip_margin_secs() -> f64 {
        contour::DEFAULT_SKIP_MARGIN_SECS
    }
}
