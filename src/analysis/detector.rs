// src/analysis/detector.rs
//! Breath-cycle detection
//!
//! Segments a sample buffer into complete breath cycles by tracking the
//! sign of `pressure - threshold` through a 4-state machine. A cycle is the
//! span between one inhalation trigger (negative-to-positive crossing) and
//! the next; an unmatched trailing trigger is an incomplete cycle and is
//! discarded.

use crate::source::Sample;

/// A rising threshold crossing: the inhalation trigger point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleMarker {
    /// Index of the crossing sample in the analyzed buffer
    pub index: usize,
    /// The crossing sample itself
    pub sample: Sample,
}

/// One complete breath cycle, `start..end` indices into the sample buffer.
/// Both indices point at rising threshold crossings; `end` is the trigger
/// of the breath that follows this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// Index of this cycle's inhalation trigger
    pub start: usize,
    /// Index of the next cycle's inhalation trigger
    pub end: usize,
}

/// Derive the trigger threshold from the observed pressure floor.
///
/// Ties detection to the buffer minimum, so noisy floors degrade
/// segmentation; callers can pin an explicit threshold instead to avoid
/// recomputation drift between analysis passes.
pub fn derive_threshold(samples: &[Sample], factor: f64) -> f64 {
    let peep_min = samples
        .iter()
        .map(|s| s.pressure)
        .fold(f64::INFINITY, f64::min);
    if peep_min.is_finite() {
        peep_min * factor
    } else {
        0.0
    }
}

/// Threshold-crossing cycle detector
#[derive(Debug, Clone)]
pub struct CycleDetector {
    threshold: f64,
}

impl CycleDetector {
    /// Create a detector with a fixed trigger threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Detector threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sweep the buffer recording every inhalation trigger.
    ///
    /// Looking for patterns in negative (N) and positive (P) regions of
    /// `pressure - threshold`: the sequence N, P, N, P delimits one full
    /// cycle. Samples exactly at the threshold belong to neither region and
    /// never fire a transition. If the marker list ends with an unmatched
    /// trigger, it is dropped.
    pub fn detect(&self, samples: &[Sample]) -> Vec<CycleMarker> {
        let mut markers = Vec::new();
        let mut state = State::Idle;

        for (i, sample) in samples.iter().enumerate().skip(1) {
            let shifted = sample.pressure - self.threshold;
            state = match state {
                State::Idle if shifted < 0.0 => State::Below,
                State::Below if shifted > 0.0 => {
                    // N -> P: start of inhalation
                    markers.push(CycleMarker { index: i, sample: *sample });
                    State::Above
                }
                State::Above if shifted < 0.0 => State::Pause,
                State::Pause if shifted > 0.0 => {
                    // end of pause, start of the next inhalation
                    markers.push(CycleMarker { index: i, sample: *sample });
                    State::Above
                }
                other => other,
            };
        }

        if markers.len() % 2 != 0 {
            // incomplete trailing cycle
            markers.pop();
        }
        markers
    }

    /// Pair consecutive markers into complete cycles
    pub fn cycles(&self, markers: &[CycleMarker]) -> Vec<Cycle> {
        markers
            .chunks_exact(2)
            .map(|pair| Cycle {
                start: pair[0].index,
                end: pair[1].index,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// No region seen yet
    Idle,
    /// Below threshold, awaiting the first rise
    Below,
    /// Above threshold, awaiting the fall into pause/exhale
    Above,
    /// Below threshold again, awaiting the next cycle's rise
    Pause,
}
