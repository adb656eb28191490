// src/model/template.rs
//! One-cycle breath waveform templates
//!
//! A template is a recorded reference curve covering exactly one breath
//! cycle, stored as `time,pressure` CSV with the pressure floor normalized
//! to 0 so PEEP can be added during scaling. The template is immutable after
//! load; the model re-derives every scaled curve from it so repeated
//! rescaling never compounds distortion.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::source::Sample;

/// Template loading errors
#[derive(Debug)]
pub enum TemplateError {
    /// Template file missing or unreadable
    Io(String),
    /// A line could not be parsed as a `time,pressure` pair
    Parse { line: usize, content: String },
    /// Fewer than two points; no segment to interpolate over
    TooFewPoints { found: usize },
    /// Zero pressure range; scaling would divide by zero
    FlatPressure,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Io(msg) => write!(f, "template IO error: {}", msg),
            TemplateError::Parse { line, content } => {
                write!(f, "template line {} is not a time,pressure pair: '{}'", line, content)
            }
            TemplateError::TooFewPoints { found } => {
                write!(f, "template needs at least 2 points, found {}", found)
            }
            TemplateError::FlatPressure => {
                write!(f, "template pressure range is zero")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err.to_string())
    }
}

/// One breath cycle of reference samples with derived intrinsic attributes
#[derive(Debug, Clone)]
pub struct WaveformTemplate {
    points: Vec<Sample>,
    peak: f64,
    peep_floor: f64,
    cycle_duration: f64,
    base_rate_hz: f64,
}

impl WaveformTemplate {
    /// Load a template from a two-column CSV file. A missing or unreadable
    /// file is fatal at startup.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a template from any buffered reader. Unlike recorded sample
    /// streams, a template is a curated file: malformed lines are fatal.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, TemplateError> {
        let mut points = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut fields = trimmed.split(',');
            let pair = match (fields.next(), fields.next()) {
                (Some(t), Some(p)) => t.trim().parse::<f64>().ok().zip(p.trim().parse::<f64>().ok()),
                _ => None,
            };
            match pair {
                Some((time, pressure)) => points.push(Sample::new(time, pressure)),
                None => {
                    return Err(TemplateError::Parse {
                        line: line_no + 1,
                        content: trimmed.to_string(),
                    })
                }
            }
        }
        Self::from_points(points)
    }

    /// Build a template from pre-parsed points (used by tests and by
    /// callers synthesizing templates programmatically).
    pub fn from_points(points: Vec<Sample>) -> Result<Self, TemplateError> {
        if points.len() < 2 {
            return Err(TemplateError::TooFewPoints { found: points.len() });
        }

        let peak = points.iter().map(|s| s.pressure).fold(f64::MIN, f64::max);
        let peep_floor = points.iter().map(|s| s.pressure).fold(f64::MAX, f64::min);
        if peak - peep_floor == 0.0 {
            return Err(TemplateError::FlatPressure);
        }

        let cycle_duration = points.iter().map(|s| s.time).fold(f64::MIN, f64::max);
        if cycle_duration <= 0.0 {
            return Err(TemplateError::TooFewPoints { found: points.len() });
        }

        Ok(Self {
            points,
            peak,
            peep_floor,
            cycle_duration,
            base_rate_hz: 1.0 / cycle_duration,
        })
    }

    /// Reference points covering one cycle
    pub fn points(&self) -> &[Sample] {
        &self.points
    }

    /// Intrinsic peak pressure
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Intrinsic pressure floor (normalized templates have 0 here)
    pub fn peep_floor(&self) -> f64 {
        self.peep_floor
    }

    /// Duration of the single recorded cycle, seconds
    pub fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    /// Intrinsic breath rate, Hz
    pub fn base_rate_hz(&self) -> f64 {
        self.base_rate_hz
    }
}
