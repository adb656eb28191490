// src/analysis/contour.rs
//! Derivative-based breath contour analysis
//!
//! The analyzer differentiates one cycle's pressure trace and brackets the
//! inhalation rise and exhalation fall by walking the derivative until it
//! decays past a scaled limit. A secondary-minimum pass guards against an
//! early pressure spike masquerading as the exhalation: when a comparable
//! slope minimum exists further into the cycle, the brackets move there.
//!
//! Every degraded path falls back to a usable index and records a
//! [`ContourWarning`] on the resulting record instead of failing the pass.

use serde::Serialize;
use tracing::warn;

use crate::analysis::detector::Cycle;
use crate::analysis::stats::BreathStats;
use crate::config::constants::contour;
use crate::config::DetectionConfig;
use crate::source::Sample;
use crate::utils::interp_pressure;
use crate::utils::scan::{argmax, argmin_negative_after, scan_backward, scan_forward};

/// Degraded-detection notes attached to a breath record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContourWarning {
    /// Cycle too short to differentiate; metrics are mostly zero
    CycleTooShort,
    /// Skip margin ran past the buffer end and was dropped
    SkipMarginCollision,
    /// No negative slope after the rise; exhalation pinned to the buffer end
    ExhalationNotFound,
    /// Rise never flattened before the exhalation minimum
    InhalationEndNotFound,
    /// Fall never flattened before the buffer end
    ExhalationEndNotFound,
    /// A re-bracketed index landed out of range and was clamped
    BracketOutOfRange,
}

/// Inhalation/exhalation brackets resolved for one cycle, as indices into
/// the cycle slice.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Brackets {
    inhale_onset: usize,
    peak_idx: usize,
    exhale_start: usize,
    exhale_end: usize,
}

/// Per-cycle contour analyzer.
///
/// Stateless between cycles; every call to [`analyze`](Self::analyze)
/// produces a fresh [`BreathStats`] record.
#[derive(Debug, Clone)]
pub struct ContourAnalyzer {
    slope_factor: f64,
    skip_margin_secs: f64,
}

impl Default for ContourAnalyzer {
    fn default() -> Self {
        Self {
            slope_factor: contour::DEFAULT_SLOPE_FACTOR,
            skip_margin_secs: contour::DEFAULT_SKIP_MARGIN_SECS,
        }
    }
}

impl ContourAnalyzer {
    /// Build an analyzer from detection tunables
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            slope_factor: config.slope_factor,
            skip_margin_secs: config.skip_margin_secs,
        }
    }

    /// Analyze the cycle delimited by `cycle` within `samples`.
    ///
    /// The cycle end time is read from the sample at `cycle.end` (the next
    /// trigger crossing) when it exists, so the record spans the full breath
    /// even though the contour itself is bracketed inside the slice.
    pub fn analyze(&self, samples: &[Sample], cycle: Cycle) -> BreathStats {
        let end_idx = cycle.end.min(samples.len());
        let slice = &samples[cycle.start.min(end_idx)..end_idx];

        let mut warnings = Vec::new();

        if slice.len() < 2 {
            warn!(start = cycle.start, end = cycle.end, "cycle too short to analyze");
            warnings.push(ContourWarning::CycleTooShort);
            let (start, end) = match slice.first() {
                Some(s) => (s.time, s.time),
                None => (0.0, 0.0),
            };
            return BreathStats {
                start,
                end,
                warnings,
                ..Default::default()
            };
        }

        let diff = differentiate(slice);
        let brackets = self.bracket(slice, &diff, &mut warnings);
        self.extract(samples, cycle, slice, brackets, warnings)
    }

    /// Locate the four contour indices from the derivative trace
    fn bracket(&self, slice: &[Sample], diff: &[f64], warnings: &mut Vec<ContourWarning>) -> Brackets {
        let len = slice.len();

        let pressures: Vec<f64> = slice.iter().map(|s| s.pressure).collect();
        let peak_idx = argmax(&pressures).unwrap_or(0);

        let i_max = argmax(diff).unwrap_or(0);
        let diff_max = diff[i_max];

        // samples to skip past the rise peak before hunting the fall
        let mean_dt = (slice[len - 1].time - slice[0].time) / (len - 1) as f64;
        let mut skip = if mean_dt > 0.0 {
            (self.skip_margin_secs / mean_dt).round() as usize
        } else {
            0
        };
        if i_max + skip >= len {
            warn!(i_max, skip, len, "skip margin past buffer end, dropped");
            warnings.push(ContourWarning::SkipMarginCollision);
            skip = 0;
        }

        let mut i_min = match argmin_negative_after(diff, i_max + skip) {
            Some(i) => i,
            None => {
                warn!("no exhalation slope found after rise");
                warnings.push(ContourWarning::ExhalationNotFound);
                len - 1
            }
        };
        let mut diff_min = diff[i_min];

        let rise_limit = diff_max / self.slope_factor;
        let inhale_onset = scan_backward(diff, i_max, 0, |d| d < rise_limit).unwrap_or(0);
        if scan_forward(diff, i_max, i_min, |d| d < rise_limit).is_none() {
            warn!(i_max, i_min, "rise never flattened before exhalation");
            warnings.push(ContourWarning::InhalationEndNotFound);
        }

        let mut fall_limit = diff_min / self.slope_factor;
        let mut exhale_start =
            scan_backward(diff, i_min, peak_idx + 1, |d| d > fall_limit).unwrap_or(i_max);
        let mut exhale_end = match scan_forward(diff, i_min, len, |d| d > fall_limit) {
            Some(i) => i,
            None => {
                warn!(i_min, "fall never flattened before buffer end");
                warnings.push(ContourWarning::ExhalationEndNotFound);
                len - 1
            }
        };

        // An early spike can carry the steepest fall. When a comparable
        // negative slope exists past the primary bracket, the true
        // exhalation is the later one; move the brackets there.
        let second_from = if exhale_end + contour::SPECIAL_CASE_OFFSET_SAMPLES < len {
            exhale_end + contour::SPECIAL_CASE_OFFSET_SAMPLES
        } else {
            exhale_end
        };
        if let Some(second_idx) = argmin_negative_after(diff, second_from) {
            let ratio = diff_min / diff[second_idx];
            if second_idx != i_min
                && ratio > contour::SPECIAL_CASE_RATIO_LOW
                && ratio < contour::SPECIAL_CASE_RATIO_HIGH
            {
                i_min = second_idx;
                diff_min = diff[second_idx];
                fall_limit = diff_min / self.slope_factor;

                exhale_start = match scan_backward(diff, i_min, second_from, |d| d > fall_limit) {
                    Some(i) => i,
                    None => {
                        warn!(i_min, second_from, "re-bracketed fall start out of range");
                        warnings.push(ContourWarning::BracketOutOfRange);
                        len.saturating_sub(contour::FALLBACK_TAIL_SAMPLES)
                    }
                };
                exhale_end = match scan_forward(diff, i_min, len, |d| d > fall_limit) {
                    Some(i) => i,
                    None => {
                        warn!(i_min, "re-bracketed fall end out of range");
                        warnings.push(ContourWarning::BracketOutOfRange);
                        len - 1
                    }
                };
            }
        }

        Brackets {
            inhale_onset,
            peak_idx,
            exhale_start: exhale_start.min(len - 1),
            exhale_end: exhale_end.min(len - 1),
        }
    }

    /// Derive per-breath metrics from the bracketed contour
    fn extract(
        &self,
        samples: &[Sample],
        cycle: Cycle,
        slice: &[Sample],
        brackets: Brackets,
        warnings: Vec<ContourWarning>,
    ) -> BreathStats {
        let len = slice.len();
        let t = |i: usize| slice[i].time;
        let p = |i: usize| slice[i].pressure;

        let start = t(0);
        let end = samples
            .get(cycle.end)
            .map(|s| s.time)
            .unwrap_or_else(|| t(len - 1));

        let ppeak = p(brackets.peak_idx);
        let peep = slice
            .iter()
            .map(|s| s.pressure)
            .fold(f64::INFINITY, f64::min);

        // intrinsic PEEP is read ~50 ms before the cycle end, clear of the
        // next trigger crossing
        let tail_dt = if len >= 5 {
            (t(len - 1) - t(len - 5)) / 5.0
        } else {
            (t(len - 1) - t(0)) / (len - 1) as f64
        };
        let jump = if tail_dt > 0.0 {
            ((contour::PEEPI_LOOKBACK_SECS / tail_dt).round() as usize).clamp(1, len - 1)
        } else {
            1
        };
        let peepi_idx = len - jump;
        let peepi = p(peepi_idx) - peep;

        let pplat = p(brackets.exhale_start);
        let dp = pplat - peep;

        let p01 = interp_pressure(slice, t(brackets.inhale_onset) + contour::P01_OFFSET_SECS)
            .unwrap_or_default();

        let ptp = if brackets.peak_idx == 0 {
            p(0)
        } else {
            slice[..brackets.peak_idx]
                .iter()
                .map(|s| s.pressure)
                .sum::<f64>()
                / brackets.peak_idx as f64
        };

        let flow_i = t(brackets.peak_idx) - t(brackets.inhale_onset);
        let i_pause = t(brackets.exhale_start) - t(brackets.peak_idx);
        let flow_e = t(brackets.exhale_end) - t(brackets.exhale_start);
        let e_pause = t(len - 1) - t(brackets.exhale_end);

        let ins = t(brackets.exhale_start) - t(0);
        let exp = t(peepi_idx) - t(brackets.exhale_start);
        let ie_ratio = if ins > 0.0 { exp / ins } else { 0.0 };
        let ie = format!("1:{:.1}", ie_ratio);

        let span = end - start;
        let rr = if span > 0.0 { 60.0 / span } else { 0.0 };

        BreathStats {
            start,
            end,
            rr,
            peep,
            peepi,
            ppeak,
            pplat,
            dp,
            pl: 0.0,
            p01,
            ptp,
            vt: 0.0,
            flow_i,
            i_pause,
            flow_e,
            e_pause,
            ie,
            ie_ratio,
            warnings,
        }
    }
}

/// Discrete derivative of the pressure trace, seeded against the origin so
/// the output has the same length as the input.
fn differentiate(slice: &[Sample]) -> Vec<f64> {
    let mut diff = Vec::with_capacity(slice.len());
    let mut prev = Sample::new(0.0, 0.0);
    for &sample in slice {
        let dt = sample.time - prev.time;
        let slope = if dt > 0.0 {
            (sample.pressure - prev.pressure) / dt
        } else {
            0.0
        };
        diff.push(slope);
        prev = sample;
    }
    diff
}
