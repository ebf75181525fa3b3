//! # Chromatogram Container Module
//!
//! Decoding of the two binary chromatogram container families produced by
//! capillary sequencers:
//!
//! - **ABIF** (`.ab1`, `.abi`): a tagged-binary format. A root entry at the start
//!   of the file points to a directory of 28-byte entries, each naming a data
//!   block by a 4-character tag and an integer id.
//! - **SCF** (`.scf`): a fixed-layout format with a 128-byte header, a version
//!   string, and version-dependent sample and base layouts. Version 3 packs samples
//!   per channel and delta-encodes them.
//!
//! ## Features
//!
//! - **Format dispatch**: [`Container::open`] classifies the buffer once by its
//!   signature; accessors match exhaustively on the format.
//! - **Zero-copy buffer**: the container holds a [`bytes::Bytes`], so clones share
//!   the underlying bytes.
//! - **Graceful absence**: missing tags, short regions and out-of-range offsets
//!   degrade to empty or truncated results, never panics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chromatrace::container::{BaseCallSet, Channel, Container};
//!
//! let container = Container::open_path("sample.ab1")?;
//! println!("Format: {}", container.format());
//!
//! let trace = container.analyzed_trace(Channel::Dye1);
//! println!("Channel 1: {} samples", trace.len());
//!
//! let bases = container.bases(BaseCallSet::Called);
//! println!("Called bases: {}", String::from_utf8_lossy(&bases));
//!
//! // Dropping the backing buffer consumes the container
//! container.release();
//! # Ok::<(), chromatrace::container::ContainerError>(())
//! ```

mod abif;
mod chromatogram;
mod config;
mod error;
mod open;
mod scf;

pub use abif::{AbifContainer, DirectoryEntry, DIRECTORY_ENTRY_SIZE};
pub use chromatogram::{BaseCall, BaseCalls, Chromatogram, Trace};
pub use config::DecodeConfig;
pub use error::ContainerError;
pub use scf::{SampleLayout, SampleSize, ScfContainer, ScfHeader, SCF_BLOCK_LAYOUT_VERSION};

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Signature at the start of an ABIF container
pub const ABIF_MAGIC: &[u8; 4] = b"ABIF";

/// Signature at the start of an SCF container
pub const SCF_MAGIC: &[u8; 4] = b".scf";

/// Container format family, determined once from the file signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerFormat {
    /// ABIF tagged-directory format
    TaggedBinary,
    /// SCF fixed-layout format
    FixedBinary,
}

impl ContainerFormat {
    /// Classify a buffer by its first four bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..4)? {
            magic if magic == ABIF_MAGIC => Some(ContainerFormat::TaggedBinary),
            magic if magic == SCF_MAGIC => Some(ContainerFormat::FixedBinary),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::TaggedBinary => write!(f, "ABIF"),
            ContainerFormat::FixedBinary => write!(f, "SCF"),
        }
    }
}

/// A dye channel of the sequencer
///
/// Channels 1-4 carry the four primary dyes. Some five-dye chemistries record a
/// fifth channel, which only ABIF can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// First dye channel (SCF: A)
    Dye1,
    /// Second dye channel (SCF: C)
    Dye2,
    /// Third dye channel (SCF: G)
    Dye3,
    /// Fourth dye channel (SCF: T)
    Dye4,
    /// Optional fifth dye channel
    Dye5,
}

impl Channel {
    /// The four primary dye channels, in storage order
    pub const PRIMARY: [Channel; 4] = [Channel::Dye1, Channel::Dye2, Channel::Dye3, Channel::Dye4];

    /// All five channels
    pub const ALL: [Channel; 5] = [
        Channel::Dye1,
        Channel::Dye2,
        Channel::Dye3,
        Channel::Dye4,
        Channel::Dye5,
    ];

    /// One-based channel number
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Zero-based channel index
    pub fn index(self) -> usize {
        match self {
            Channel::Dye1 => 0,
            Channel::Dye2 => 1,
            Channel::Dye3 => 2,
            Channel::Dye4 => 3,
            Channel::Dye5 => 4,
        }
    }

    /// Channel for a one-based channel number
    pub fn from_number(number: u8) -> Option<Self> {
        Channel::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// ABIF `DATA` id holding the raw (unprocessed) samples
    pub fn raw_data_id(self) -> u8 {
        match self {
            Channel::Dye5 => 105,
            primary => primary.number(),
        }
    }

    /// ABIF `DATA` id holding the analyzed samples
    pub fn analyzed_data_id(self) -> u8 {
        match self {
            Channel::Dye5 => 205,
            primary => 8 + primary.number(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.number())
    }
}

/// Which of the two parallel base-call sets to read
///
/// ABIF files keep the basecaller's calls and the user's edits side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseCallSet {
    /// Calls produced by the basecaller
    #[default]
    Called,
    /// Calls as edited by the user
    Edited,
}

impl BaseCallSet {
    /// ABIF id used by the `PBAS`, `PLOC` and `PCON` tags for this set
    pub fn abif_id(self) -> u8 {
        match self {
            BaseCallSet::Edited => 1,
            BaseCallSet::Called => 2,
        }
    }
}

/// A decoded chromatogram container
///
/// The variant is fixed at open time. All accessors are read-only and
/// allocation is the only side effect.
#[derive(Debug, Clone)]
pub enum Container {
    /// ABIF tagged-binary container
    Abif(AbifContainer),
    /// SCF fixed-layout container
    Scf(ScfContainer),
}

impl Container {
    /// Format family of this container
    pub fn format(&self) -> ContainerFormat {
        match self {
            Container::Abif(_) => ContainerFormat::TaggedBinary,
            Container::Scf(_) => ContainerFormat::FixedBinary,
        }
    }

    /// The backing bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Container::Abif(abif) => abif.as_bytes(),
            Container::Scf(scf) => scf.as_bytes(),
        }
    }

    /// Size of the backing buffer in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the backing buffer is empty (never true for an opened container)
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The ABIF view, if this is an ABIF container
    pub fn as_abif(&self) -> Option<&AbifContainer> {
        match self {
            Container::Abif(abif) => Some(abif),
            Container::Scf(_) => None,
        }
    }

    /// The SCF view, if this is an SCF container
    pub fn as_scf(&self) -> Option<&ScfContainer> {
        match self {
            Container::Abif(_) => None,
            Container::Scf(scf) => Some(scf),
        }
    }

    /// Data offset of the first ABIF directory entry matching `tag` and `id`
    ///
    /// Always `None` for SCF containers.
    pub fn find_entry(&self, tag: &[u8; 4], id: u8) -> Option<u32> {
        self.as_abif().and_then(|abif| abif.find_entry(tag, id))
    }

    /// Analyzed samples for a channel; empty when absent
    pub fn analyzed_trace(&self, channel: Channel) -> Vec<u16> {
        match self {
            Container::Abif(abif) => abif.analyzed_trace(channel),
            Container::Scf(scf) => scf.analyzed_trace(channel),
        }
    }

    /// Raw samples for a channel without any decoding pass; empty when absent
    pub fn raw_trace(&self, channel: Channel) -> Vec<u16> {
        match self {
            Container::Abif(abif) => abif.raw_trace(channel),
            Container::Scf(scf) => scf.raw_trace(channel),
        }
    }

    /// Whether the container carries data for the fifth dye channel
    pub fn has_fifth_channel(&self) -> bool {
        match self {
            Container::Abif(abif) => abif.has_fifth_channel(),
            Container::Scf(_) => false,
        }
    }

    /// Bases of one call set as ASCII bytes
    pub fn bases(&self, set: BaseCallSet) -> Vec<u8> {
        match self {
            Container::Abif(abif) => abif.bases(set),
            Container::Scf(scf) => scf.bases(),
        }
    }

    /// Bases produced by the basecaller
    pub fn called_bases(&self) -> Vec<u8> {
        self.bases(BaseCallSet::Called)
    }

    /// Bases as edited by the user
    pub fn edited_bases(&self) -> Vec<u8> {
        self.bases(BaseCallSet::Edited)
    }

    /// Peak locations (sample indices) of one call set
    pub fn peak_locations(&self, set: BaseCallSet) -> Vec<u32> {
        match self {
            Container::Abif(abif) => abif.peak_locations(set),
            Container::Scf(scf) => scf.peak_locations(),
        }
    }

    /// Peak locations of the basecaller's calls
    pub fn called_peak_locations(&self) -> Vec<u32> {
        self.peak_locations(BaseCallSet::Called)
    }

    /// Peak locations of the user's edited calls
    pub fn edited_peak_locations(&self) -> Vec<u32> {
        self.peak_locations(BaseCallSet::Edited)
    }

    /// Per-base quality values of one call set
    pub fn qualities(&self, set: BaseCallSet) -> Vec<u8> {
        match self {
            Container::Abif(abif) => abif.qualities(set),
            Container::Scf(scf) => scf.qualities(),
        }
    }

    /// Quality values of the basecaller's calls
    pub fn called_qualities(&self) -> Vec<u8> {
        self.qualities(BaseCallSet::Called)
    }

    /// Quality values of the user's edited calls
    pub fn edited_qualities(&self) -> Vec<u8> {
        self.qualities(BaseCallSet::Edited)
    }

    /// Base carried by each primary channel, as ASCII
    ///
    /// ABIF reads the filter-wheel order (`FWO_`); SCF is always `ACGT`.
    pub fn base_order(&self) -> [u8; 4] {
        match self {
            Container::Abif(abif) => abif.base_order().unwrap_or(*b"ACGT"),
            Container::Scf(_) => *b"ACGT",
        }
    }

    /// Base call set bundled with its parallel quality and location arrays
    pub fn base_calls(&self, set: BaseCallSet) -> BaseCalls {
        BaseCalls {
            set,
            bases: String::from_utf8_lossy(&self.bases(set)).into_owned(),
            qualities: self.qualities(set),
            peak_locations: self.peak_locations(set),
        }
    }

    /// Decode every channel and the configured base-call set into a snapshot
    pub fn decode(&self, config: &DecodeConfig) -> Chromatogram {
        let order = self.base_order();
        let channels: &[Channel] = if config.fifth_channel && self.has_fifth_channel() {
            &Channel::ALL
        } else {
            &Channel::PRIMARY
        };

        let traces = channels
            .iter()
            .map(|&channel| Trace {
                channel,
                base: order.get(channel.index()).map(|&b| b as char),
                analyzed: self.analyzed_trace(channel),
                raw: if config.include_raw {
                    self.raw_trace(channel)
                } else {
                    Vec::new()
                },
            })
            .collect();

        Chromatogram {
            format: self.format(),
            base_order: String::from_utf8_lossy(&order).into_owned(),
            traces,
            base_calls: self.base_calls(config.base_calls),
        }
    }

    /// Drop the backing buffer
    ///
    /// Consumes the container, so no accessor can observe released data.
    pub fn release(self) {
        log::debug!("Releasing {} container ({} bytes)", self.format(), self.len());
    }

    /// Give up the container and take back its backing buffer
    pub fn into_bytes(self) -> Bytes {
        match self {
            Container::Abif(abif) => abif.into_bytes(),
            Container::Scf(scf) => scf.into_bytes(),
        }
    }
}
