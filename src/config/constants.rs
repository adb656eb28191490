// src/config/constants.rs
//! System-wide configuration constants
//!
//! All tunable numbers used by the detection and simulation paths live here
//! so the algorithm code carries no magic values.

/// Breath-cycle detection constants
pub mod detection {
    /// Trigger threshold = observed pressure floor * this factor.
    pub const DEFAULT_THRESHOLD_FACTOR: f64 = 1.25;
    /// Minimum accepted threshold factor (at 1.0 the trigger sits on the floor)
    pub const MIN_THRESHOLD_FACTOR: f64 = 1.0;
    /// Maximum accepted threshold factor
    pub const MAX_THRESHOLD_FACTOR: f64 = 3.0;

    /// Leading samples kept before the first trigger so captures look
    /// aligned to the breath start.
    pub const TRIGGER_HOLDOFF_SAMPLES: usize = 10;
}

/// Contour bracketing constants
pub mod contour {
    /// Divisor of the peak slope that marks where the waveform flattens.
    pub const DEFAULT_SLOPE_FACTOR: f64 = 10.0;
    /// Minimum accepted slope factor; below this the brackets collapse onto
    /// the extremes themselves.
    pub const MIN_SLOPE_FACTOR: f64 = 2.0;

    /// Seconds to move past the inhalation rise peak before searching for
    /// the exhalation minimum, to avoid catching residual rise noise.
    pub const DEFAULT_SKIP_MARGIN_SECS: f64 = 0.3;

    /// Samples past the primary exhalation bracket where the search for a
    /// secondary, comparable-magnitude minimum begins.
    pub const SPECIAL_CASE_OFFSET_SAMPLES: usize = 10;

    /// Lower bound of the similarity window for the secondary-minimum
    /// override.
    pub const SPECIAL_CASE_RATIO_LOW: f64 = 0.7;
    /// Upper bound of the similarity window for the secondary-minimum
    /// override.
    pub const SPECIAL_CASE_RATIO_HIGH: f64 = 1.3;

    /// Occlusion pressure is read this far into the inhalation.
    pub const P01_OFFSET_SECS: f64 = 0.1;

    /// Intrinsic PEEP is read this far before the cycle end, away from the
    /// next inhalation's threshold crossing.
    pub const PEEPI_LOOKBACK_SECS: f64 = 0.05;

    /// Fallback distance from the buffer end when a bracket index lands out
    /// of range.
    pub const FALLBACK_TAIL_SAMPLES: usize = 10;
}

/// Waveform simulation constants
pub mod simulation {
    /// Default breath rate, breaths per minute
    pub const DEFAULT_BPM: f64 = 30.0;
    /// Default peak inspiratory pressure target, cm H2O
    pub const DEFAULT_PEAK_CM_H2O: f64 = 31.0;
    /// Default PEEP target, cm H2O
    pub const DEFAULT_PEEP_CM_H2O: f64 = 5.0;

    /// Minimum accepted breath rate
    pub const MIN_BPM: f64 = 1.0;
    /// Maximum accepted breath rate
    pub const MAX_BPM: f64 = 120.0;

    /// Synthetic sensor sample period for paced acquisition.
    pub const DEFAULT_SAMPLE_PERIOD_SECS: f64 = 0.01;
}

/// Recorded-stream constants
pub mod recording {
    /// Raw vendor rows carry no timestamp; time is synthesized at this rate.
    pub const RAW_SAMPLE_RATE_HZ: f64 = 50.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_relationships() {
        assert!(detection::MIN_THRESHOLD_FACTOR <= detection::DEFAULT_THRESHOLD_FACTOR);
        assert!(detection::DEFAULT_THRESHOLD_FACTOR <= detection::MAX_THRESHOLD_FACTOR);
        assert!(contour::SPECIAL_CASE_RATIO_LOW < 1.0);
        assert!(contour::SPECIAL_CASE_RATIO_HIGH > 1.0);
        assert!(simulation::DEFAULT_PEAK_CM_H2O > simulation::DEFAULT_PEEP_CM_H2O);
    }
}
