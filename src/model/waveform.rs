// src/model/waveform.rs
//! Parameterizable breath waveform model
//!
//! Scales a one-cycle template to target rate/peak/PEEP and produces
//! interpolated pressure readings for arbitrary query times with periodic
//! rollover, turning the short template into an endless simulated sensor
//! stream. Optional per-cycle jitter re-scales peak and PEEP within a
//! percentage band around the captured baseline.

use std::fmt;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::{JitterPct, ScaleConfig};
use crate::model::template::WaveformTemplate;
use crate::source::Sample;
use crate::utils::interp::interp_pressure;

/// Waveform model errors
#[derive(Debug)]
pub enum ModelError {
    /// Scale targets failed validation
    Validation(String),
    /// Operation requires the model to have been scaled first
    NotScaled,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Validation(msg) => write!(f, "scale validation failed: {}", msg),
            ModelError::NotScaled => write!(f, "model has not been scaled yet"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Breath waveform model backed by an immutable template
#[derive(Debug, Clone)]
pub struct WaveformModel {
    template: WaveformTemplate,
    curve: Vec<Sample>,

    /// First non-regenerate scale targets; jitter draws around these.
    baseline: Option<ScaleConfig>,

    rate_bpm: f64,
    peak: f64,
    peep: f64,
    cycle_duration: f64,

    /// Last jittered query time, used to detect cycle-boundary crossings.
    prev_jitter_time: f64,
}

impl WaveformModel {
    /// Create an unscaled model; samples reflect the raw template until the
    /// first `scale` call.
    pub fn new(template: WaveformTemplate) -> Self {
        let curve = template.points().to_vec();
        let cycle_duration = template.cycle_duration();
        let peak = template.peak();
        let peep = template.peep_floor();
        Self {
            template,
            curve,
            baseline: None,
            rate_bpm: 60.0 / cycle_duration,
            peak,
            peep,
            cycle_duration,
            prev_jitter_time: 0.0,
        }
    }

    /// Re-derive the scaled curve from the pristine template.
    ///
    /// Each template point `(t, p)` maps to
    /// `(t * base_rate / (bpm/60), p * (peak - peep) / template_peak + peep)`.
    ///
    /// With `regenerate = false` the config is stored as the model baseline;
    /// with `regenerate = true` the baseline is left untouched so mid-stream
    /// jitter never loses the original target.
    pub fn scale(&mut self, config: ScaleConfig, regenerate: bool) -> Result<(), ModelError> {
        config
            .validate()
            .map_err(|e| ModelError::Validation(e.to_string()))?;

        let bps = config.bpm / 60.0;
        let base_rate = self.template.base_rate_hz();
        let template_peak = self.template.peak();
        let span = config.peak - config.peep;

        self.curve = self
            .template
            .points()
            .iter()
            .map(|s| {
                Sample::new(
                    s.time * base_rate / bps,
                    s.pressure * span / template_peak + config.peep,
                )
            })
            .collect();

        self.cycle_duration = self.curve.iter().map(|s| s.time).fold(f64::MIN, f64::max);
        self.rate_bpm = 60.0 / self.cycle_duration;
        self.peak = self.curve.iter().map(|s| s.pressure).fold(f64::MIN, f64::max);
        self.peep = config.peep;

        if !regenerate {
            self.baseline = Some(config);
        }

        debug!(
            bpm = self.rate_bpm,
            peak = self.peak,
            peep = self.peep,
            window = self.cycle_duration,
            regenerate,
            "model scaled"
        );
        Ok(())
    }

    /// Simulated sensor reading at `time` seconds.
    ///
    /// The query time is folded into `[0, cycle_duration)` so the model
    /// rolls over periodically; pressure is linearly interpolated between
    /// the bracketing curve points.
    pub fn sample(&self, time: f64) -> Result<f64, ModelError> {
        let folded = time % self.cycle_duration;
        interp_pressure(&self.curve, folded).ok_or(ModelError::NotScaled)
    }

    /// Simulated sensor reading with per-cycle randomized re-scaling.
    ///
    /// On crossing into a new cycle, peak and PEEP are redrawn uniformly
    /// within ± the configured percentage of the *baseline* config and the
    /// model is re-scaled with `regenerate = true`. Rate jitter is ignored:
    /// changing bpm mid-stream desynchronizes sample spacing. Deterministic
    /// for a seeded `rng`.
    pub fn sample_with_jitter(
        &mut self,
        time: f64,
        jitter: JitterPct,
        rng: &mut impl Rng,
    ) -> Result<f64, ModelError> {
        let duration = self.cycle_duration;
        if (time / duration).floor() > (self.prev_jitter_time / duration).floor() {
            let baseline = self.baseline.ok_or(ModelError::NotScaled)?;

            let peak = draw_around(rng, baseline.peak, jitter.peak);
            let peep = draw_around(rng, baseline.peep, jitter.peep);
            let config = ScaleConfig::new(baseline.bpm, peak, peep);

            match config.validate() {
                Ok(()) => self.scale(config, true)?,
                // a draw can invert peak/peep at extreme percentages; keep
                // the previous scale rather than emitting a broken cycle
                Err(e) => warn!(error = %e, "jitter draw rejected, keeping previous scale"),
            }
        }
        self.prev_jitter_time = time;
        self.sample(time)
    }

    /// Baseline scale config captured by the first non-regenerate scale
    pub fn baseline(&self) -> Option<ScaleConfig> {
        self.baseline
    }

    /// Current breath rate, breaths per minute
    pub fn rate_bpm(&self) -> f64 {
        self.rate_bpm
    }

    /// Current peak pressure of the scaled curve
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Current PEEP floor of the scaled curve
    pub fn peep(&self) -> f64 {
        self.peep
    }

    /// Duration of one scaled cycle, seconds
    pub fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    /// Steepest pressure change per second across the scaled curve,
    /// bounding how far two nearby samples can differ.
    pub fn max_slope(&self) -> f64 {
        self.curve
            .windows(2)
            .map(|w| {
                let dt = w[1].time - w[0].time;
                if dt > 0.0 {
                    ((w[1].pressure - w[0].pressure) / dt).abs()
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max)
    }
}

fn draw_around(rng: &mut impl Rng, base: f64, pct: f64) -> f64 {
    if pct == 0.0 {
        return base;
    }
    base * (1.0 + rng.gen_range(-pct..=pct) / 100.0)
}
