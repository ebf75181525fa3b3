//! Intrinsic-peak model and total-signal peak finding
//!
//! An intrinsic-peak stream describes one symmetric peak per called base. The
//! model rebuilds each peak from its recorded right half, sums the peaks of
//! each channel into a cumulative signal, and scans that signal for the
//! combined peaks a viewer draws on top of the trace.
//!
//! # Example
//!
//! ```
//! use chromatrace::intrinsic::{IntrinsicPeakModel, PeakShape};
//!
//! let text = ">sample\nA 10 3 0 0 0 0\n5 3 1\n";
//! let model: IntrinsicPeakModel = text.parse()?;
//! assert_eq!(model.peaks()[0].values(), &[1.0, 3.0, 5.0, 3.0, 1.0]);
//! assert_eq!(model.total_signal_peaks().len(), 1);
//! # Ok::<(), chromatrace::intrinsic::IntrinsicError>(())
//! ```

mod error;
mod parse;
mod peak;
mod scanner;
mod signal;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

pub use error::IntrinsicError;
pub use parse::{
    parse_or_default, FieldDiagnostic, HEADER_MARKER, MAX_RECORD_SAMPLES, MAX_STREAM_SAMPLES,
};
pub use peak::{channel_of, IntrinsicPeak, PeakShape, TotalSignalPeak, SIGNAL_BASES};
pub use scanner::{PeakScanner, ScannedRun, MAX_PEAK_WIDTH};
pub use signal::{CumulativeSignal, MAX_SIGNAL_LENGTH};

/// Parsed intrinsic peaks together with the total-signal peaks derived from them
///
/// Built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct IntrinsicPeakModel {
    title: String,
    peaks: Vec<IntrinsicPeak>,
    signal: CumulativeSignal,
    total_signal: Vec<TotalSignalPeak>,
    diagnostics: Vec<FieldDiagnostic>,
}

impl IntrinsicPeakModel {
    /// Parse a record stream
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, IntrinsicError> {
        Self::parse_with_progress(reader, |_| {})
    }

    /// Parse a record stream, reporting the bytes consumed after every line
    pub fn parse_with_progress<R, F>(reader: R, progress: F) -> Result<Self, IntrinsicError>
    where
        R: BufRead,
        F: FnMut(u64),
    {
        let parsed = parse::parse_records(reader, progress)?;

        for diagnostic in &parsed.diagnostics {
            debug!("{}", diagnostic);
        }
        if !parsed.diagnostics.is_empty() {
            warn!(
                "{} field(s) in the intrinsic peak stream were replaced by defaults",
                parsed.diagnostics.len()
            );
        }

        let mut model = Self::from_peaks(parsed.peaks);
        model.title = parsed.title;
        model.diagnostics = parsed.diagnostics;
        Ok(model)
    }

    /// Open and parse a record file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IntrinsicError> {
        let path = path.as_ref();
        debug!("Reading intrinsic peaks from {}", path.display());
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Build the model from already reconstructed peaks
    ///
    /// The scan stops once it has produced as many total-signal peaks as there
    /// are intrinsic peaks.
    pub fn from_peaks(peaks: Vec<IntrinsicPeak>) -> Self {
        let signal = CumulativeSignal::build(&peaks);
        let runs = PeakScanner::new(signal.slices()).scan(peaks.len());

        let total_signal: Vec<TotalSignalPeak> = runs
            .into_iter()
            .map(|run| {
                let values = signal.channel(run.channel)[run.range.clone()].to_vec();
                TotalSignalPeak::new(
                    SIGNAL_BASES[run.channel],
                    signal.x_of(run.range.start),
                    values,
                )
            })
            .collect();

        debug!(
            "Derived {} total-signal peaks from {} intrinsic peaks",
            total_signal.len(),
            peaks.len()
        );

        Self {
            title: String::new(),
            peaks,
            signal,
            total_signal,
            diagnostics: Vec::new(),
        }
    }

    /// Header text after the `>` marker
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Reconstructed intrinsic peaks, in record order
    pub fn peaks(&self) -> &[IntrinsicPeak] {
        &self.peaks
    }

    /// Peaks of the summed signal, in scan order
    pub fn total_signal_peaks(&self) -> &[TotalSignalPeak] {
        &self.total_signal
    }

    /// The per-channel cumulative signal the total-signal peaks came from
    pub fn cumulative_signal(&self) -> &CumulativeSignal {
        &self.signal
    }

    /// Every field that fell back to a default while parsing
    pub fn diagnostics(&self) -> &[FieldDiagnostic] {
        &self.diagnostics
    }
}

impl FromStr for IntrinsicPeakModel {
    type Err = IntrinsicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}
