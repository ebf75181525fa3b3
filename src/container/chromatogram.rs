use std::fmt;

use serde::Serialize;

use super::{BaseCallSet, Channel, ContainerFormat};

/// Decoded samples of one dye channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// The channel
    pub channel: Channel,
    /// Base carried by this channel, when known
    pub base: Option<char>,
    /// Analyzed (processed) samples
    pub analyzed: Vec<u16>,
    /// Raw samples; empty when not requested or not stored
    pub raw: Vec<u16>,
}

impl Trace {
    /// Number of analyzed samples
    pub fn len(&self) -> usize {
        self.analyzed.len()
    }

    /// Whether the channel has no analyzed samples
    pub fn is_empty(&self) -> bool {
        self.analyzed.is_empty()
    }

    /// Largest analyzed sample, if any
    pub fn max_value(&self) -> Option<u16> {
        self.analyzed.iter().copied().max()
    }
}

/// One called base with its quality and position in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaseCall {
    /// Base character
    pub base: char,
    /// Quality value, when the container stores one for this base
    pub quality: Option<u8>,
    /// Peak location as a sample index, when stored
    pub peak_location: Option<u32>,
}

/// A base-call set with its parallel quality and peak-location arrays
///
/// The three arrays normally have the same length, but nothing in either
/// format enforces it; [`BaseCalls::iter`] pads missing values with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseCalls {
    /// Which set these calls come from
    pub set: BaseCallSet,
    /// Bases as a string
    pub bases: String,
    /// Quality values, parallel to `bases`
    pub qualities: Vec<u8>,
    /// Peak locations, parallel to `bases`
    pub peak_locations: Vec<u32>,
}

impl BaseCalls {
    /// Number of bases
    pub fn len(&self) -> usize {
        self.bases.chars().count()
    }

    /// Whether the set holds no bases
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Iterate the calls base by base
    pub fn iter(&self) -> impl Iterator<Item = BaseCall> + '_ {
        self.bases.chars().enumerate().map(move |(i, base)| BaseCall {
            base,
            quality: self.qualities.get(i).copied(),
            peak_location: self.peak_locations.get(i).copied(),
        })
    }

    /// Whether the quality and location arrays match the base count
    pub fn is_consistent(&self) -> bool {
        let n = self.len();
        (self.qualities.is_empty() || self.qualities.len() == n)
            && (self.peak_locations.is_empty() || self.peak_locations.len() == n)
    }
}

/// Snapshot of a decoded container, handed to rendering and export layers
#[derive(Debug, Clone, Serialize)]
pub struct Chromatogram {
    /// Source format
    pub format: ContainerFormat,
    /// Base carried by channels 1-4
    pub base_order: String,
    /// One trace per decoded channel
    pub traces: Vec<Trace>,
    /// The selected base-call set
    pub base_calls: BaseCalls,
}

impl Chromatogram {
    /// Trace of one channel, if decoded
    pub fn trace(&self, channel: Channel) -> Option<&Trace> {
        self.traces.iter().find(|t| t.channel == channel)
    }

    /// Length of the longest analyzed trace
    pub fn sample_count(&self) -> usize {
        self.traces.iter().map(Trace::len).max().unwrap_or(0)
    }
}

impl fmt::Display for Chromatogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Base order: {}", self.base_order)?;
        for trace in &self.traces {
            write!(f, "  {}", trace.channel)?;
            if let Some(base) = trace.base {
                write!(f, " ({})", base)?;
            }
            writeln!(
                f,
                ": {} analyzed, {} raw, max {}",
                trace.analyzed.len(),
                trace.raw.len(),
                trace.max_value().unwrap_or(0)
            )?;
        }
        writeln!(
            f,
            "Bases ({:?}): {}",
            self.base_calls.set,
            self.base_calls.len()
        )?;
        Ok(())
    }
}
