//! vent-core: mechanical-ventilation waveform synthesis and breath analysis
//!
//! This library covers the two halves of a pressure-waveform monitoring
//! pipeline:
//!
//! - A waveform synthesizer that scales a recorded breath template to target
//!   rate and pressures and serves an infinite, optionally jittered sample
//!   stream through the same source trait as recorded data
//! - A cycle-detection and feature-extraction engine that finds complete
//!   breath cycles by threshold crossing and derives per-breath metrics
//!   (PEEP, Ppeak, Pplat, driving pressure, P0.1, phase durations, I:E)
//!   from the pressure derivative contour
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vent_core::analysis::StatsAggregator;
//! use vent_core::config::MonitorConfig;
//! use vent_core::model::{WaveformModel, WaveformTemplate};
//! use vent_core::source::{ModelSource, SamplingSession};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::default();
//!
//!     // Synthesize a scaled breath stream from a recorded template
//!     let template = WaveformTemplate::from_path("template.csv")?;
//!     let mut model = WaveformModel::new(template);
//!     model.scale(config.simulation.scale, false)?;
//!
//!     let source = ModelSource::new(model, config.simulation.sample_period_secs);
//!     let mut session = SamplingSession::new(source, 10.0);
//!     session.read_for(30.0)?;
//!
//!     // Extract per-breath metrics from the captured buffer
//!     let mut stats = StatsAggregator::new(config.detection.clone());
//!     for record in stats.compute(session.samples()) {
//!         println!("{}", serde_json::to_string(record)?);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod source;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::{BreathStats, ContourAnalyzer, CycleDetector, StatsAggregator};
pub use config::{DetectionConfig, MonitorConfig, ScaleConfig, SimulationConfig};
pub use error::{VentError, VentResult};
pub use model::{WaveformModel, WaveformTemplate};
pub use source::{Sample, SampleSource, SamplingSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Ventilation waveform synthesis and breath analysis library".to_string(),
        features: vec![
            "Template-driven waveform synthesis".to_string(),
            "Per-cycle randomized re-scaling".to_string(),
            "Recorded-stream playback".to_string(),
            "Threshold-crossing cycle detection".to_string(),
            "Derivative-contour breath metrics".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
