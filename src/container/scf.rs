//! SCF fixed-layout containers
//!
//! The 128-byte header is a sequence of big-endian `u32` fields, except for
//! the version, which is four ASCII characters such as `"3.00"`:
//!
//! ```text
//! 0   magic ".scf"        28  comments size
//! 4   sample count        32  comments offset
//! 8   samples offset      36  version (ASCII)
//! 12  base count          40  sample size (1 or 2)
//! 16  left clip           44  code set
//! 20  right clip          48  private size
//! 24  bases offset        52  private offset
//! ```
//!
//! Before version 2.9 samples are interleaved (A, C, G, T per record) and each
//! base is a 12-byte record. From 2.9 on samples are stored as one delta-encoded
//! block per channel and bases as parallel arrays.

use bytes::Bytes;
use log::{debug, warn};
use serde::Serialize;

use super::{Channel, ContainerError, ContainerFormat};
use crate::numeric::{
    clamped_region, delta_decode_1byte, delta_decode_2byte, read_be_u32, read_u8,
};

/// Size of the fixed SCF header
pub const SCF_HEADER_SIZE: usize = 128;

/// First version whose samples are stored as delta-encoded per-channel blocks
pub const SCF_BLOCK_LAYOUT_VERSION: f32 = 2.9;

const SAMPLES_FIELD: usize = 4;
const SAMPLES_OFFSET_FIELD: usize = 8;
const BASES_FIELD: usize = 12;
const LEFT_CLIP_FIELD: usize = 16;
const RIGHT_CLIP_FIELD: usize = 20;
const BASES_OFFSET_FIELD: usize = 24;
const COMMENTS_SIZE_FIELD: usize = 28;
const COMMENTS_OFFSET_FIELD: usize = 32;
const VERSION_FIELD: usize = 36;
const SAMPLE_SIZE_FIELD: usize = 40;
const CODE_SET_FIELD: usize = 44;
const PRIVATE_SIZE_FIELD: usize = 48;
const PRIVATE_OFFSET_FIELD: usize = 52;

/// Size of one base record in the interleaved (pre-2.9) layout
const INTERLEAVED_BASE_STRIDE: usize = 12;
/// Size of one peak index in the block (2.9+) layout
const BLOCK_PEAK_STRIDE: usize = 4;
/// Bytes per base across all parallel arrays of the block layout
const BLOCK_BASE_RECORD: usize = 12;

/// Bytes per stored trace sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleSize {
    /// One byte per sample, modulus 256
    OneByte,
    /// Two big-endian bytes per sample, modulus 65536
    TwoBytes,
}

impl SampleSize {
    fn from_header(value: u32) -> Self {
        match value {
            1 => SampleSize::OneByte,
            2 => SampleSize::TwoBytes,
            other => {
                debug!("Unexpected SCF sample size {}, assuming 2 bytes", other);
                SampleSize::TwoBytes
            }
        }
    }

    /// Byte width of one sample
    pub fn bytes(self) -> usize {
        match self {
            SampleSize::OneByte => 1,
            SampleSize::TwoBytes => 2,
        }
    }
}

/// How samples and bases are laid out, chosen by version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleLayout {
    /// One record per sample point holding all four channels; no delta encoding
    Interleaved,
    /// One delta-encoded block per channel
    ChannelBlocks,
}

/// Decoded SCF header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScfHeader {
    /// Number of sample points per channel
    pub samples: u32,
    /// Offset of the sample data
    pub samples_offset: u32,
    /// Number of called bases
    pub bases: u32,
    /// Bases clipped from the left
    pub bases_left_clip: u32,
    /// Bases clipped from the right
    pub bases_right_clip: u32,
    /// Offset of the base data
    pub bases_offset: u32,
    /// Size of the comment block
    pub comments_size: u32,
    /// Offset of the comment block
    pub comments_offset: u32,
    /// Version as written in the file, e.g. `"3.00"`
    pub version_text: String,
    /// Version as a number
    pub version: f32,
    /// Bytes per sample
    pub sample_size: SampleSize,
    /// Character code set
    pub code_set: u32,
    /// Size of the private data block
    pub private_size: u32,
    /// Offset of the private data block
    pub private_offset: u32,
}

impl ScfHeader {
    fn parse(bytes: &[u8]) -> Result<Self, ContainerError> {
        if bytes.len() < SCF_HEADER_SIZE {
            return Err(ContainerError::TruncatedHeader {
                format: ContainerFormat::FixedBinary,
                required: SCF_HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        // Length checked above, so every fixed field is in range
        let field = |offset| read_be_u32(bytes, offset).unwrap_or_default();

        let raw_version = &bytes[VERSION_FIELD..VERSION_FIELD + 4];
        let version_text = String::from_utf8_lossy(raw_version)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string();
        let version = version_text
            .parse::<f32>()
            .map_err(|_| ContainerError::InvalidVersion(version_text.clone()))?;

        Ok(Self {
            samples: field(SAMPLES_FIELD),
            samples_offset: field(SAMPLES_OFFSET_FIELD),
            bases: field(BASES_FIELD),
            bases_left_clip: field(LEFT_CLIP_FIELD),
            bases_right_clip: field(RIGHT_CLIP_FIELD),
            bases_offset: field(BASES_OFFSET_FIELD),
            comments_size: field(COMMENTS_SIZE_FIELD),
            comments_offset: field(COMMENTS_OFFSET_FIELD),
            version_text,
            version,
            sample_size: SampleSize::from_header(field(SAMPLE_SIZE_FIELD)),
            code_set: field(CODE_SET_FIELD),
            private_size: field(PRIVATE_SIZE_FIELD),
            private_offset: field(PRIVATE_OFFSET_FIELD),
        })
    }

    /// Sample and base layout for this version
    pub fn layout(&self) -> SampleLayout {
        if self.version < SCF_BLOCK_LAYOUT_VERSION {
            SampleLayout::Interleaved
        } else {
            SampleLayout::ChannelBlocks
        }
    }
}

/// An open SCF container
#[derive(Debug, Clone)]
pub struct ScfContainer {
    bytes: Bytes,
    header: ScfHeader,
}

impl ScfContainer {
    /// Read the fixed header of an SCF buffer
    pub(crate) fn parse(bytes: Bytes) -> Result<Self, ContainerError> {
        let header = ScfHeader::parse(&bytes)?;
        debug!(
            "Opened SCF v{} container: {} samples ({:?}), {} bases",
            header.version_text, header.samples, header.sample_size, header.bases
        );
        Ok(Self { bytes, header })
    }

    /// The backing bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// The decoded header
    pub fn header(&self) -> &ScfHeader {
        &self.header
    }

    /// Version as a number
    pub fn version(&self) -> f32 {
        self.header.version
    }

    /// Stored samples of one channel, before any delta decoding
    fn stored_samples(&self, channel: Channel) -> Vec<u16> {
        if channel == Channel::Dye5 {
            return Vec::new();
        }

        let samples = self.header.samples as usize;
        let width = self.header.sample_size.bytes();
        let offset = self.header.samples_offset as usize;
        let channel_index = channel.index();

        let values: Vec<u16> = match self.header.layout() {
            SampleLayout::Interleaved => {
                let stride = width * 4;
                let region = clamped_region(&self.bytes, offset, samples.saturating_mul(stride));
                region
                    .chunks_exact(stride)
                    .map(|record| sample_at(record, channel_index * width, width))
                    .collect()
            }
            SampleLayout::ChannelBlocks => {
                let block_len = samples.saturating_mul(width);
                let start = offset.saturating_add(block_len.saturating_mul(channel_index));
                clamped_region(&self.bytes, start, block_len)
                    .chunks_exact(width)
                    .map(|sample| sample_at(sample, 0, width))
                    .collect()
            }
        };

        if values.len() < samples {
            warn!(
                "SCF {} holds {} of {} declared samples",
                channel,
                values.len(),
                samples
            );
        }
        values
    }

    /// Analyzed samples for a channel (A, C, G, T for channels 1-4)
    ///
    /// Block-layout samples are delta-decoded in their stored width.
    pub fn analyzed_trace(&self, channel: Channel) -> Vec<u16> {
        let stored = self.stored_samples(channel);
        match (self.header.layout(), self.header.sample_size) {
            (SampleLayout::Interleaved, _) => stored,
            (SampleLayout::ChannelBlocks, SampleSize::OneByte) => {
                let mut narrow: Vec<u8> = stored.iter().map(|&v| v as u8).collect();
                delta_decode_1byte(&mut narrow);
                narrow.into_iter().map(u16::from).collect()
            }
            (SampleLayout::ChannelBlocks, SampleSize::TwoBytes) => {
                let mut samples = stored;
                delta_decode_2byte(&mut samples);
                samples
            }
        }
    }

    /// Stored samples for a channel without the delta pass
    pub fn raw_trace(&self, channel: Channel) -> Vec<u16> {
        self.stored_samples(channel)
    }

    /// Interleaved bases region and the number of records it fully contains
    fn base_region(&self, record_bytes: usize) -> (&[u8], usize) {
        let count = self.header.bases as usize;
        let region = clamped_region(
            &self.bytes,
            self.header.bases_offset as usize,
            count.saturating_mul(record_bytes),
        );
        let available = region.len() / record_bytes;
        if available < count {
            warn!("SCF holds {} of {} declared bases", available, count);
        }
        (region, available.min(count))
    }

    /// Per-base records: (peak index, [prob A, C, G, T], base)
    fn base_records(&self) -> Vec<(u32, [u8; 4], u8)> {
        match self.header.layout() {
            SampleLayout::Interleaved => {
                let (region, count) = self.base_region(INTERLEAVED_BASE_STRIDE);
                region
                    .chunks_exact(INTERLEAVED_BASE_STRIDE)
                    .take(count)
                    .map(|record| {
                        let peak = read_be_u32(record, 0).unwrap_or_default();
                        let probs = [record[4], record[5], record[6], record[7]];
                        (peak, probs, record[8])
                    })
                    .collect()
            }
            SampleLayout::ChannelBlocks => {
                // peak indices (4n), four probability arrays (4 * n), bases (n), spare (3n)
                let declared = self.header.bases as usize;
                let region = clamped_region(
                    &self.bytes,
                    self.header.bases_offset as usize,
                    declared.saturating_mul(BLOCK_BASE_RECORD),
                );
                let bases_start = declared.saturating_mul(BLOCK_PEAK_STRIDE + 4);
                let count = region.len().saturating_sub(bases_start).min(declared);
                if count < declared {
                    warn!("SCF holds {} of {} declared bases", count, declared);
                }

                let probability = |array: usize, i: usize| {
                    read_u8(region, declared * BLOCK_PEAK_STRIDE + array * declared + i)
                        .unwrap_or_default()
                };
                (0..count)
                    .map(|i| {
                        let peak = read_be_u32(region, i * BLOCK_PEAK_STRIDE).unwrap_or_default();
                        let probs = [
                            probability(0, i),
                            probability(1, i),
                            probability(2, i),
                            probability(3, i),
                        ];
                        let base = read_u8(region, bases_start + i).unwrap_or(b'N');
                        (peak, probs, base)
                    })
                    .collect()
            }
        }
    }

    /// Called bases as ASCII
    pub fn bases(&self) -> Vec<u8> {
        self.base_records().into_iter().map(|(_, _, base)| base).collect()
    }

    /// Peak index of every base
    pub fn peak_locations(&self) -> Vec<u32> {
        self.base_records().into_iter().map(|(peak, _, _)| peak).collect()
    }

    /// Quality of every base: the probability stored for the called base's
    /// channel, or the highest of the four for ambiguity codes
    pub fn qualities(&self) -> Vec<u8> {
        self.base_records()
            .into_iter()
            .map(|(_, probs, base)| match base.to_ascii_uppercase() {
                b'A' => probs[0],
                b'C' => probs[1],
                b'G' => probs[2],
                b'T' => probs[3],
                _ => probs.iter().copied().max().unwrap_or_default(),
            })
            .collect()
    }

    /// Comment block as text
    pub fn comments(&self) -> String {
        let region = clamped_region(
            &self.bytes,
            self.header.comments_offset as usize,
            self.header.comments_size as usize,
        );
        String::from_utf8_lossy(region)
            .trim_end_matches('\0')
            .to_string()
    }
}

/// Read one sample of `width` bytes at `offset` inside `record`
fn sample_at(record: &[u8], offset: usize, width: usize) -> u16 {
    match width {
        1 => record.get(offset).map(|&b| u16::from(b)).unwrap_or_default(),
        _ => record
            .get(offset..offset + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .unwrap_or_default(),
    }
}
