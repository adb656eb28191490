// src/analysis/mod.rs
//! Breath cycle detection and feature extraction
//!
//! The analysis pipeline runs in three stages: [`CycleDetector`] finds
//! complete breath cycles by threshold crossing, [`ContourAnalyzer`] brackets
//! each cycle's inhalation and exhalation from the pressure derivative, and
//! [`StatsAggregator`] drives both to accumulate one [`BreathStats`] record
//! per cycle.

pub mod contour;
pub mod detector;
pub mod stats;

pub use contour::{ContourAnalyzer, ContourWarning};
pub use detector::{derive_threshold, Cycle, CycleDetector, CycleMarker};
pub use stats::{BreathStats, BreathSummary, StatsAggregator};
