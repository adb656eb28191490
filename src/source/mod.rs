// src/source/mod.rs
//! Sample acquisition
//!
//! Everything downstream of this module consumes an ordered stream of
//! [`Sample`]s, whether they come from the waveform model ([`ModelSource`])
//! or from a recorded file ([`recorded::RecordedSampleSource`]). Both
//! sources produce strictly non-decreasing time by construction.

pub mod recorded;
pub mod session;

pub use recorded::{ChannelKind, RecordedSampleSource, SourceError};
pub use session::{BreathMarker, SamplingSession};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::JitterPct;
use crate::error::VentResult;
use crate::model::WaveformModel;

/// One pressure reading: time in seconds, pressure in cm H2O
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since stream start
    pub time: f64,
    /// Airway pressure, cm H2O
    pub pressure: f64,
}

impl Sample {
    /// Create a sample
    pub fn new(time: f64, pressure: f64) -> Self {
        Self { time, pressure }
    }
}

/// A pull-based stream of pressure samples.
///
/// `Ok(None)` signals end of stream; simulated sources are infinite and
/// never return it.
pub trait SampleSource {
    /// Produce the next sample in time order
    fn next_sample(&mut self) -> VentResult<Option<Sample>>;
}

/// Adapts a [`WaveformModel`] into an infinite sample source driven by a
/// monotonic synthetic clock.
pub struct ModelSource {
    model: WaveformModel,
    period: f64,
    clock: f64,
    jitter: Option<JitterPct>,
    rng: StdRng,
}

impl ModelSource {
    /// Create a source sampling the model every `period` seconds
    pub fn new(model: WaveformModel, period: f64) -> Self {
        Self {
            model,
            period,
            clock: 0.0,
            jitter: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Enable per-cycle jitter with a seeded random source so runs replay
    /// identically
    pub fn with_jitter(mut self, jitter: JitterPct, seed: u64) -> Self {
        self.jitter = Some(jitter);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Access the underlying model
    pub fn model(&self) -> &WaveformModel {
        &self.model
    }
}

impl SampleSource for ModelSource {
    fn next_sample(&mut self) -> VentResult<Option<Sample>> {
        let time = self.clock;
        let pressure = match self.jitter {
            Some(jitter) => self.model.sample_with_jitter(time, jitter, &mut self.rng)?,
            None => self.model.sample(time)?,
        };
        self.clock += self.period;
        Ok(Some(Sample::new(time, pressure)))
    }
}
