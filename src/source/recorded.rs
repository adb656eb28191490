// src/source/recorded.rs
//! Recorded ventilator sample streams
//!
//! Reads line-oriented CSV recordings in two shapes:
//!
//! - clean rows: `time,value`
//! - raw vendor rows: `flow, pressure` pairs with interleaved metadata
//!   lines (ISO-like timestamps, breath-start `BS, S:<n>,`, breath-end
//!   `BE`)
//!
//! Metadata and malformed lines are skipped, never fatal. Raw rows carry no
//! timestamp; time is synthesized from the row index at a fixed 50 Hz
//! sample rate. Seeing any metadata line switches the stream into raw mode.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tracing::warn;

use crate::config::constants::recording::RAW_SAMPLE_RATE_HZ;
use crate::error::VentResult;
use crate::source::Sample;

/// Recorded-stream errors
#[derive(Debug)]
pub enum SourceError {
    /// File missing or unreadable (fatal at startup)
    Io(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(msg) => write!(f, "recorded stream IO error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// Which column of a raw vendor row to treat as the sample value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// Airway pressure (raw column 1)
    #[default]
    Pressure,
    /// Flow rate (raw column 0)
    Flow,
}

/// Sequential reader over a recorded sample stream with replay support
#[derive(Debug)]
pub struct RecordedSampleSource<R> {
    reader: R,
    channel: ChannelKind,
    raw_mode: bool,
    points: u64,
}

impl RecordedSampleSource<BufReader<File>> {
    /// Open a recorded CSV file for the pressure channel
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::from_path_channel(path, ChannelKind::Pressure)
    }

    /// Open a recorded CSV file selecting the raw-mode channel
    pub fn from_path_channel(
        path: impl AsRef<Path>,
        channel: ChannelKind,
    ) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(BufReader::new(file), channel))
    }
}

impl<R: BufRead + Seek> RecordedSampleSource<R> {
    /// Wrap any seekable buffered reader
    pub fn from_reader(reader: R, channel: ChannelKind) -> Self {
        Self {
            reader,
            channel,
            raw_mode: false,
            points: 0,
        }
    }

    /// Read the next numeric sample, skipping metadata and malformed lines.
    /// Returns `Ok(None)` at end of stream.
    pub fn next_sample(&mut self) -> VentResult<Option<Sample>> {
        loop {
            let mut raw = Vec::new();
            let read = self
                .reader
                .read_until(b'\n', &mut raw)
                .map_err(SourceError::from)?;
            if read == 0 {
                return Ok(None);
            }

            // vendor recordings occasionally contain invalid UTF-8; decode
            // lossily so one bad byte does not end the stream
            let line = String::from_utf8_lossy(&raw);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut fields = trimmed.split(',');
            let pair = match (fields.next(), fields.next()) {
                (Some(a), Some(b)) => a.trim().parse::<f64>().ok().zip(b.trim().parse::<f64>().ok()),
                _ => None,
            };

            match pair {
                Some((first, second)) => {
                    let sample = if self.raw_mode {
                        // raw rows are `flow, pressure` with no timestamp
                        let value = match self.channel {
                            ChannelKind::Pressure => second,
                            ChannelKind::Flow => first,
                        };
                        let time = self.points as f64 / RAW_SAMPLE_RATE_HZ;
                        self.points += 1;
                        Sample::new(time, value)
                    } else {
                        Sample::new(first, second)
                    };
                    return Ok(Some(sample));
                }
                None => {
                    // timestamp lines, BS/BE breath markers, or junk:
                    // skipping them is the expected path for raw recordings
                    warn!(line = trimmed, "skipping non-numeric line");
                    self.raw_mode = true;
                }
            }
        }
    }

    /// Reset to the start of the stream for replay
    pub fn rewind(&mut self) -> VentResult<()> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map_err(SourceError::from)?;
        self.points = 0;
        self.raw_mode = false;
        Ok(())
    }

    /// Whether the stream has been identified as a raw vendor recording
    pub fn is_raw(&self) -> bool {
        self.raw_mode
    }
}

impl<R: BufRead + Seek> super::SampleSource for RecordedSampleSource<R> {
    fn next_sample(&mut self) -> VentResult<Option<Sample>> {
        RecordedSampleSource::next_sample(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RAW_RECORDING: &str = "\
2192-07-15-04-43-37.103707
BS, S:2244,
3.5, 6.2
4.1, 8.9
2.2, 14.0
BE
BS, S:2245,
1.0, 5.5
";

    #[test]
    fn test_clean_rows_pass_through() {
        let data = "0.0,5.0\n0.02,6.5\n0.04,9.1\n";
        let mut source = RecordedSampleSource::from_reader(Cursor::new(data), ChannelKind::Pressure);

        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(0.0, 5.0));
        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(0.02, 6.5));
        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(0.04, 9.1));
        assert!(source.next_sample().unwrap().is_none());
        assert!(!source.is_raw());
    }

    #[test]
    fn test_raw_mode_synthesizes_time_at_50hz() {
        let mut source =
            RecordedSampleSource::from_reader(Cursor::new(RAW_RECORDING), ChannelKind::Pressure);

        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(0.0, 6.2));
        assert!(source.is_raw());

        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(1.0 / 50.0, 8.9));

        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(2.0 / 50.0, 14.0));

        // BE and the next BS marker are skipped, numbering continues
        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s, Sample::new(3.0 / 50.0, 5.5));

        assert!(source.next_sample().unwrap().is_none());
    }

    #[test]
    fn test_flow_channel_selects_first_column() {
        let mut source =
            RecordedSampleSource::from_reader(Cursor::new(RAW_RECORDING), ChannelKind::Flow);
        let s = source.next_sample().unwrap().unwrap();
        assert_eq!(s.pressure, 3.5);
    }

    #[test]
    fn test_rewind_replays_first_sample() {
        let mut source =
            RecordedSampleSource::from_reader(Cursor::new(RAW_RECORDING), ChannelKind::Pressure);

        let first = source.next_sample().unwrap().unwrap();
        source.next_sample().unwrap().unwrap();
        source.next_sample().unwrap().unwrap();

        source.rewind().unwrap();
        let replayed = source.next_sample().unwrap().unwrap();
        assert_eq!(first, replayed);
    }

    #[test]
    fn test_time_order_is_nondecreasing() {
        let mut source =
            RecordedSampleSource::from_reader(Cursor::new(RAW_RECORDING), ChannelKind::Pressure);
        let mut prev = f64::NEG_INFINITY;
        while let Some(sample) = source.next_sample().unwrap() {
            assert!(sample.time >= prev);
            prev = sample.time;
        }
    }

    #[test]
    fn test_source_debug_format() {
        let source =
            RecordedSampleSource::from_reader(Cursor::new("0.0,1.0\n"), ChannelKind::Pressure);
        let text = format!("{:?}", source);
        assert!(text.contains("RecordedSampleSource"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = RecordedSampleSource::from_path("/nonexistent/recording.csv").unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
