// src/analysis/stats.rs
//! Per-breath statistics records and the accumulating aggregator
//!
//! Each analyzed cycle produces one `BreathStats` record. The aggregator
//! owns the detector/analyzer pairing and appends a fresh record per cycle
//! on every pass; downstream consumers serialize records as JSON rows keyed
//! by the conventional clinical labels.

use serde::Serialize;
use tracing::debug;

use crate::analysis::contour::{ContourAnalyzer, ContourWarning};
use crate::analysis::detector::{derive_threshold, CycleDetector};
use crate::config::DetectionConfig;
use crate::source::Sample;

/// Metrics extracted from a single breath cycle.
///
/// Serialized field names follow the clinical labels used on ventilator
/// displays. `vt` and `pl` require flow and esophageal channels that the
/// pressure-only pipeline does not carry; they serialize as zero.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct BreathStats {
    /// Cycle start time, seconds
    #[serde(rename = "Start")]
    pub start: f64,

    /// Cycle end time, seconds
    #[serde(rename = "End")]
    pub end: f64,

    /// Respiratory rate implied by this cycle's span, breaths/min
    #[serde(rename = "RR")]
    pub rr: f64,

    /// Positive end-expiratory pressure, the cycle pressure floor
    #[serde(rename = "PEEP")]
    pub peep: f64,

    /// Intrinsic PEEP, residual pressure above the floor near cycle end
    #[serde(rename = "PEEPi")]
    pub peepi: f64,

    /// Peak inspiratory pressure
    #[serde(rename = "Ppeak")]
    pub ppeak: f64,

    /// Plateau pressure at the start of the exhalation fall
    #[serde(rename = "Pplat")]
    pub pplat: f64,

    /// Driving pressure, plateau minus PEEP
    #[serde(rename = "dP")]
    pub dp: f64,

    /// Transpulmonary pressure (needs an esophageal channel; always zero)
    #[serde(rename = "Pl")]
    pub pl: f64,

    /// Occlusion pressure 100 ms into the inhalation rise
    #[serde(rename = "P01")]
    pub p01: f64,

    /// Pressure-time product, mean pressure over the inhalation rise
    #[serde(rename = "PTP")]
    pub ptp: f64,

    /// Tidal volume (needs a flow channel; always zero)
    #[serde(rename = "Vt")]
    pub vt: f64,

    /// Inspiratory flow phase duration, onset to pressure peak
    #[serde(rename = "FlowI")]
    pub flow_i: f64,

    /// Inspiratory pause, pressure peak to exhalation fall start
    #[serde(rename = "Ipause")]
    pub i_pause: f64,

    /// Expiratory flow phase duration across the fall
    #[serde(rename = "FlowE")]
    pub flow_e: f64,

    /// Expiratory pause, fall end to cycle end
    #[serde(rename = "Epause")]
    pub e_pause: f64,

    /// Inspiratory:expiratory ratio rendered as `1:x.x`
    #[serde(rename = "I:E")]
    pub ie: String,

    /// Numeric expiratory/inspiratory ratio behind the `I:E` label
    #[serde(skip)]
    pub ie_ratio: f64,

    /// Degraded-detection notes raised while bracketing this cycle
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ContourWarning>,
}

/// Aggregate view over a batch of breath records
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BreathSummary {
    /// Number of analyzed cycles
    pub breaths: usize,
    /// Mean respiratory rate, breaths/min
    pub mean_rr: f64,
    /// Mean peak inspiratory pressure
    pub mean_ppeak: f64,
    /// Mean PEEP
    pub mean_peep: f64,
}

/// Accumulating cycle-detection and feature-extraction engine.
///
/// Each `compute` pass derives (or reuses) the trigger threshold, detects
/// complete cycles in the buffer and appends one fresh record per cycle.
/// Records are never reset implicitly; callers drain them with
/// [`take_records`](Self::take_records).
#[derive(Debug)]
pub struct StatsAggregator {
    detection: DetectionConfig,
    analyzer: ContourAnalyzer,
    records: Vec<BreathStats>,
}

impl StatsAggregator {
    /// Create an aggregator from detection tunables
    pub fn new(detection: DetectionConfig) -> Self {
        let analyzer = ContourAnalyzer::from_config(&detection);
        Self {
            detection,
            analyzer,
            records: Vec::new(),
        }
    }

    /// Analyze every complete cycle in `samples`, appending one record per
    /// cycle. Returns the records appended by this pass.
    pub fn compute(&mut self, samples: &[Sample]) -> &[BreathStats] {
        let threshold = match self.detection.threshold {
            Some(t) => t,
            None => derive_threshold(samples, self.detection.threshold_factor),
        };

        let detector = CycleDetector::new(threshold);
        let markers = detector.detect(samples);
        let cycles = detector.cycles(&markers);

        debug!(
            threshold,
            cycles = cycles.len(),
            samples = samples.len(),
            "analysis pass"
        );

        let before = self.records.len();
        for cycle in cycles {
            self.records.push(self.analyzer.analyze(samples, cycle));
        }
        &self.records[before..]
    }

    /// All records accumulated so far
    pub fn records(&self) -> &[BreathStats] {
        &self.records
    }

    /// Drain the accumulated records
    pub fn take_records(&mut self) -> Vec<BreathStats> {
        std::mem::take(&mut self.records)
    }

    /// Mean metrics over the accumulated records, `None` when empty
    pub fn summary(&self) -> Option<BreathSummary> {
        if self.records.is_empty() {
            return None;
        }
        let n = self.records.len() as f64;
        Some(BreathSummary {
            breaths: self.records.len(),
            mean_rr: self.records.iter().map(|r| r.rr).sum::<f64>() / n,
            mean_ppeak: self.records.iter().map(|r| r.ppeak).sum::<f64>() / n,
            mean_peep: self.records.iter().map(|r| r.peep).sum::<f64>() / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breath_buffer(periods: usize) -> Vec<Sample> {
        // trapezoid breaths at 50 Hz: quiet, rise, plateau, fall, quiet
        let mut samples = Vec::new();
        for p in 0..periods {
            let base = p as f64 * 4.0;
            for i in 0..200 {
                let local = i as f64 * 0.02;
                let pressure = if local < 0.5 {
                    0.0
                } else if local < 1.0 {
                    (local - 0.5) * 40.0
                } else if local < 2.0 {
                    20.0
                } else if local < 2.5 {
                    20.0 - (local - 2.0) * 40.0
                } else {
                    0.0
                };
                samples.push(Sample::new(base + local, pressure));
            }
        }
        samples
    }

    #[test]
    fn test_compute_appends_one_record_per_cycle() {
        let mut agg = StatsAggregator::new(DetectionConfig {
            threshold: Some(10.0),
            ..Default::default()
        });

        // five periods: rises pair into two disjoint cycles
        let appended = agg.compute(&breath_buffer(5));
        assert_eq!(appended.len(), 2);
        assert_eq!(agg.records().len(), 2);
    }

    #[test]
    fn test_records_accumulate_across_passes() {
        let mut agg = StatsAggregator::new(DetectionConfig {
            threshold: Some(10.0),
            ..Default::default()
        });

        let buffer = breath_buffer(5);
        agg.compute(&buffer);
        agg.compute(&buffer);
        assert_eq!(agg.records().len(), 4);

        let drained = agg.take_records();
        assert_eq!(drained.len(), 4);
        assert!(agg.records().is_empty());
    }

    #[test]
    fn test_records_are_independent() {
        let mut agg = StatsAggregator::new(DetectionConfig {
            threshold: Some(10.0),
            ..Default::default()
        });
        agg.compute(&breath_buffer(5));

        let records = agg.records();
        assert_eq!(records.len(), 2);
        // same waveform shape, different absolute times
        assert!((records[0].ppeak - records[1].ppeak).abs() < 1e-9);
        assert!(records[0].start < records[1].start);
        assert_ne!(records[0].start, records[1].start);
    }

    #[test]
    fn test_derived_threshold_matches_pinned() {
        // floor is 0 so the derived threshold is 0; pin instead and compare
        let buffer: Vec<Sample> = breath_buffer(5)
            .into_iter()
            .map(|s| Sample::new(s.time, s.pressure + 8.0))
            .collect();

        let mut derived = StatsAggregator::new(DetectionConfig::default());
        let mut pinned = StatsAggregator::new(DetectionConfig {
            threshold: Some(10.0),
            ..Default::default()
        });

        // derived: floor 8.0 * 1.25 = 10.0
        let a = derived.compute(&buffer).to_vec();
        let b = pinned.compute(&buffer).to_vec();
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].start, b[0].start);
    }

    #[test]
    fn test_summary_means() {
        let mut agg = StatsAggregator::new(DetectionConfig {
            threshold: Some(10.0),
            ..Default::default()
        });
        assert!(agg.summary().is_none());

        agg.compute(&breath_buffer(5));
        let summary = agg.summary().unwrap();
        assert_eq!(summary.breaths, 2);
        assert!((summary.mean_ppeak - 20.0).abs() < 1e-9);
        assert!(summary.mean_peep.abs() < 1e-9);
    }

    #[test]
    fn test_serialized_labels() {
        let record = BreathStats {
            ppeak: 21.5,
            ie: "1:1.4".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Ppeak"], 21.5);
        assert_eq!(json["I:E"], "1:1.4");
        assert!(json.get("PEEP").is_some());
        assert!(json.get("warnings").is_none());
    }
}
