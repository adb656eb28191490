// src/source/session.rs
//! Sampling sessions
//!
//! A session pulls samples from a source into an in-memory buffer, either in
//! bulk or paced in real time, and runs streaming threshold triggers for
//! breath tracking and counting. The buffered data is handed to
//! [`crate::analysis::StatsAggregator`] for per-cycle analysis.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::constants::detection::TRIGGER_HOLDOFF_SAMPLES;
use crate::error::VentResult;
use crate::source::{Sample, SampleSource};

/// One counted breath: trigger times of its first and next inhalation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathMarker {
    /// Time of the inhalation trigger, seconds
    pub start: f64,
    /// Time of the next inhalation trigger, seconds
    pub end: f64,
    /// 1-based breath number within the stream
    pub ordinal: usize,
}

/// Drives a sample source and owns the session's sample buffer.
///
/// All state is owned exclusively by the session; cancellation is
/// cooperative (a timeout check inside the sampling loop).
pub struct SamplingSession<S> {
    source: S,
    threshold: f64,
    buffer: Vec<Sample>,
}

impl<S: SampleSource> SamplingSession<S> {
    /// Create a session with a pinned trigger threshold
    pub fn new(source: S, threshold: f64) -> Self {
        Self {
            source,
            threshold,
            buffer: Vec::new(),
        }
    }

    /// Buffered samples collected so far
    pub fn samples(&self) -> &[Sample] {
        &self.buffer
    }

    /// Move the buffer out of the session, leaving it empty
    pub fn take_samples(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.buffer)
    }

    /// Session trigger threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Bulk replay: pull samples until `seconds` of stream time have been
    /// buffered or the source ends. Returns the number of samples added.
    pub fn read_for(&mut self, seconds: f64) -> VentResult<usize> {
        let before = self.buffer.len();
        let start_time = loop {
            match self.buffer.first() {
                Some(first) => break first.time,
                None => match self.source.next_sample()? {
                    Some(sample) => self.buffer.push(sample),
                    None => return Ok(self.buffer.len() - before),
                },
            }
        };

        loop {
            if let Some(last) = self.buffer.last() {
                if last.time - start_time >= seconds {
                    break;
                }
            }
            match self.source.next_sample()? {
                Some(sample) => self.buffer.push(sample),
                None => break,
            }
        }
        debug!(added = self.buffer.len() - before, "bulk read complete");
        Ok(self.buffer.len() - before)
    }

    /// Real-time pacing: like [`read_for`](Self::read_for) but blocks for
    /// `period` before each pull, simulating live acquisition.
    pub fn read_paced(&mut self, seconds: f64, period: Duration) -> VentResult<usize> {
        let before = self.buffer.len();
        let mut elapsed = 0.0;
        let period_secs = period.as_secs_f64();
        info!(seconds, period_secs, "sampling sensor");
        while elapsed < seconds {
            std::thread::sleep(period);
            match self.source.next_sample()? {
                Some(sample) => self.buffer.push(sample),
                None => break,
            }
            elapsed += period_secs;
        }
        Ok(self.buffer.len() - before)
    }

    /// Track `cycles` complete breaths into the buffer.
    ///
    /// Before the first trigger the buffer is trimmed to the last few
    /// samples so every capture starts in the same time window relative to
    /// the breath onset. Returns the number of complete breaths captured
    /// (fewer than requested if the source ends early).
    pub fn track_breaths(&mut self, cycles: usize) -> VentResult<usize> {
        let mut breath_count = 0usize;
        let mut state = TriggerState::BelowAwaitingRise;

        info!(cycles, threshold = self.threshold, "tracking breaths");
        while breath_count < cycles {
            let sample = match self.source.next_sample()? {
                Some(sample) => sample,
                None => break,
            };
            self.buffer.push(sample);

            match state {
                TriggerState::BelowAwaitingRise => {
                    if breath_count == 0 && self.buffer.len() > TRIGGER_HOLDOFF_SAMPLES {
                        let excess = self.buffer.len() - TRIGGER_HOLDOFF_SAMPLES;
                        self.buffer.drain(0..excess);
                    }
                    if sample.pressure > self.threshold {
                        state = TriggerState::AboveAwaitingFall;
                    }
                }
                TriggerState::AboveAwaitingFall => {
                    if sample.pressure < self.threshold {
                        state = TriggerState::BelowAwaitingNextRise;
                    }
                }
                TriggerState::BelowAwaitingNextRise => {
                    if sample.pressure > self.threshold {
                        state = TriggerState::AboveAwaitingFall;
                        breath_count += 1;
                    }
                }
            }
        }
        Ok(breath_count)
    }

    /// Stream the whole source counting complete breaths, without
    /// buffering.
    ///
    /// Checks `timeout` against the wall clock inside the loop and exits
    /// early with the markers found so far.
    pub fn count_breaths(&mut self, timeout: Duration) -> VentResult<Vec<BreathMarker>> {
        let mut markers = Vec::new();
        let mut state = TriggerState::BelowAwaitingRise;
        let mut trigger_start = 0.0f64;
        let mut samples = 0u64;
        let clock = Instant::now();

        loop {
            if clock.elapsed() > timeout {
                info!(timeout_secs = timeout.as_secs_f64(), "breath counting timed out");
                break;
            }
            let sample = match self.source.next_sample()? {
                Some(sample) => sample,
                None => {
                    debug!("finished reading source data");
                    break;
                }
            };
            samples += 1;

            match state {
                TriggerState::BelowAwaitingRise => {
                    if sample.pressure > self.threshold {
                        state = TriggerState::AboveAwaitingFall;
                        trigger_start = sample.time;
                    }
                }
                TriggerState::AboveAwaitingFall => {
                    if sample.pressure < self.threshold {
                        state = TriggerState::BelowAwaitingNextRise;
                    }
                }
                TriggerState::BelowAwaitingNextRise => {
                    if sample.pressure > self.threshold {
                        // this rise both closes the current breath and
                        // opens the next one
                        markers.push(BreathMarker {
                            start: trigger_start,
                            end: sample.time,
                            ordinal: markers.len() + 1,
                        });
                        trigger_start = sample.time;
                        state = TriggerState::AboveAwaitingFall;
                    }
                }
            }
        }
        info!(
            samples,
            threshold = self.threshold,
            breaths = markers.len(),
            "breath count complete"
        );
        Ok(markers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TriggerState {
    BelowAwaitingRise,
    AboveAwaitingFall,
    BelowAwaitingNextRise,
}

/// Flag breaths whose duration deviates from the stream mean by more than
/// ± `tolerance_pct` percent. Useful for quickly locating irregular
/// breathing intervals in long recordings before replaying them in detail.
pub fn find_irregular_cycles(markers: &[BreathMarker], tolerance_pct: f64) -> Vec<BreathMarker> {
    if markers.is_empty() {
        return Vec::new();
    }

    let mean_duration =
        markers.iter().map(|m| m.end - m.start).sum::<f64>() / markers.len() as f64;
    let hi = mean_duration * (1.0 + tolerance_pct / 100.0);
    let lo = mean_duration * (1.0 - tolerance_pct / 100.0);

    markers
        .iter()
        .filter(|m| {
            let duration = m.end - m.start;
            duration > hi || duration < lo
        })
        .copied()
        .collect()
}
