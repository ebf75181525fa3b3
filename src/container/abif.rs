//! ABIF tagged-binary containers
//!
//! Layout of the fixed header:
//!
//! ```text
//! offset  size  field
//! 0       4     "ABIF"
//! 4       2     file version (e.g. 101)
//! 6       28    root directory entry ("tdir")
//!   18    4       number of directory entries
//!   26    4       offset of the directory
//! ```
//!
//! Each directory entry is 28 bytes:
//!
//! ```text
//! 0   4  tag name          12  4  element count
//! 4   4  tag number        16  4  data size in bytes
//! 8   2  element type      20  4  data offset (or inline data if size <= 4)
//! 10  2  element size      24  4  data handle (unused)
//! ```

use bytes::Bytes;
use log::{debug, warn};
use serde::{Serialize, Serializer};

use super::{BaseCallSet, Channel, ContainerError, ContainerFormat};
use crate::numeric::{clamped_region, read_be_u16, read_be_u16_run, read_be_u32, read_u8};

/// Size of one directory entry in bytes
pub const DIRECTORY_ENTRY_SIZE: usize = 28;

/// Bytes needed to read the signature, version and root entry
const HEADER_SIZE: usize = 34;
const VERSION_OFFSET: usize = 4;
const ENTRY_COUNT_OFFSET: usize = 18;
const DIRECTORY_OFFSET_OFFSET: usize = 26;

// Sub-offsets within a directory entry
const TAG_FIELD: usize = 0;
const NUMBER_FIELD: usize = 4;
const ID_BYTE_FIELD: usize = 7;
const ELEMENT_TYPE_FIELD: usize = 8;
const ELEMENT_SIZE_FIELD: usize = 10;
const ELEMENT_COUNT_FIELD: usize = 12;
const DATA_SIZE_FIELD: usize = 16;
const DATA_OFFSET_FIELD: usize = 20;

/// Data blocks of at most this many bytes live in the data-offset field itself
const INLINE_DATA_LIMIT: u32 = 4;

/// ABIF element type code for Pascal strings (length-prefixed)
const PSTRING_TYPE: u16 = 18;
/// ABIF element type code for C strings (NUL-terminated)
const CSTRING_TYPE: u16 = 19;

/// One entry of the ABIF directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Four-character tag name, e.g. `DATA` or `PBAS`
    #[serde(serialize_with = "serialize_tag")]
    pub tag: [u8; 4],
    /// Tag number distinguishing entries with the same name
    pub number: u32,
    /// ABIF element type code
    pub element_type: u16,
    /// Size of one element in bytes
    pub element_size: u16,
    /// Number of elements
    pub element_count: u32,
    /// Total data size in bytes
    pub data_size: u32,
    /// Data offset, or the data itself when `data_size <= 4`
    pub data_offset: u32,
    /// Absolute position of this entry in the container
    pub position: usize,
}

fn serialize_tag<S: Serializer>(tag: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(tag))
}

impl DirectoryEntry {
    /// Parse the entry stored at `position`, if it lies fully inside `bytes`
    fn parse(bytes: &[u8], position: usize) -> Option<Self> {
        let end = position.checked_add(DIRECTORY_ENTRY_SIZE)?;
        let slot = bytes.get(position..end)?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&slot[TAG_FIELD..TAG_FIELD + 4]);

        Some(Self {
            tag,
            number: read_be_u32(slot, NUMBER_FIELD)?,
            element_type: read_be_u16(slot, ELEMENT_TYPE_FIELD)?,
            element_size: read_be_u16(slot, ELEMENT_SIZE_FIELD)?,
            element_count: read_be_u32(slot, ELEMENT_COUNT_FIELD)?,
            data_size: read_be_u32(slot, DATA_SIZE_FIELD)?,
            data_offset: read_be_u32(slot, DATA_OFFSET_FIELD)?,
            position,
        })
    }

    /// Tag name as a string
    pub fn tag_name(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    /// Whether the data is stored inline in the data-offset field
    pub fn is_inline(&self) -> bool {
        self.data_size <= INLINE_DATA_LIMIT
    }
}

/// An open ABIF container
#[derive(Debug, Clone)]
pub struct AbifContainer {
    bytes: Bytes,
    version: u16,
    entry_count: u32,
    directory_offset: u32,
}

impl AbifContainer {
    /// Read the fixed header of an ABIF buffer
    pub(crate) fn parse(bytes: Bytes) -> Result<Self, ContainerError> {
        let truncated = || ContainerError::TruncatedHeader {
            format: ContainerFormat::TaggedBinary,
            required: HEADER_SIZE,
            actual: bytes.len(),
        };

        if bytes.len() < HEADER_SIZE {
            return Err(truncated());
        }
        let version = read_be_u16(&bytes, VERSION_OFFSET).ok_or_else(truncated)?;
        let entry_count = read_be_u32(&bytes, ENTRY_COUNT_OFFSET).ok_or_else(truncated)?;
        let directory_offset = read_be_u32(&bytes, DIRECTORY_OFFSET_OFFSET).ok_or_else(truncated)?;

        let directory_end = (directory_offset as u64)
            .saturating_add(entry_count as u64 * DIRECTORY_ENTRY_SIZE as u64);
        if directory_end > bytes.len() as u64 {
            warn!(
                "ABIF directory ({} entries at offset {}) extends past the end of the {}-byte buffer",
                entry_count,
                directory_offset,
                bytes.len()
            );
        }

        debug!(
            "Opened ABIF v{} container: {} entries at offset {}",
            version, entry_count, directory_offset
        );

        Ok(Self {
            bytes,
            version,
            entry_count,
            directory_offset,
        })
    }

    /// The backing bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// ABIF file version (e.g. 101)
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Number of directory entries declared by the root entry
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Absolute offset of the directory
    pub fn directory_offset(&self) -> u32 {
        self.directory_offset
    }

    /// Positions of the directory slots that lie fully inside the buffer
    fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        let start = self.directory_offset as usize;
        let len = self.bytes.len();
        (0..self.entry_count as usize)
            .map_while(move |i| {
                i.checked_mul(DIRECTORY_ENTRY_SIZE)
                    .and_then(|delta| start.checked_add(delta))
            })
            .take_while(move |&position| {
                position
                    .checked_add(DIRECTORY_ENTRY_SIZE)
                    .map_or(false, |end| end <= len)
            })
    }

    /// All directory entries that lie inside the buffer, in directory order
    pub fn entries(&self) -> impl Iterator<Item = DirectoryEntry> + '_ {
        self.slots()
            .filter_map(move |position| DirectoryEntry::parse(&self.bytes, position))
    }

    /// Data offset of the first entry whose tag and id byte match
    ///
    /// Only the low byte of the tag number is compared. A data offset of 0
    /// marks the entry as absent.
    pub fn find_entry(&self, tag: &[u8; 4], id: u8) -> Option<u32> {
        self.locate(tag, id).map(|entry| entry.data_offset)
    }

    /// First entry whose tag and id byte match, with the same absence rule as
    /// [`find_entry`](Self::find_entry)
    pub fn locate(&self, tag: &[u8; 4], id: u8) -> Option<DirectoryEntry> {
        let position = self.slots().find(|&position| {
            let slot = &self.bytes[position..position + DIRECTORY_ENTRY_SIZE];
            &slot[TAG_FIELD..TAG_FIELD + 4] == tag && slot[ID_BYTE_FIELD] == id
        })?;

        let entry = DirectoryEntry::parse(&self.bytes, position)?;
        if entry.data_offset == 0 {
            debug!(
                "Entry {}{} at {} has data offset 0; treating as absent",
                entry.tag_name(),
                id,
                position
            );
            return None;
        }
        Some(entry)
    }

    /// Bytes of an entry's data block, clamped to the buffer
    pub fn entry_data(&self, entry: &DirectoryEntry) -> &[u8] {
        if entry.is_inline() {
            let start = entry.position + DATA_OFFSET_FIELD;
            return clamped_region(&self.bytes, start, entry.data_size as usize);
        }

        let data = clamped_region(
            &self.bytes,
            entry.data_offset as usize,
            entry.data_size as usize,
        );
        if data.len() < entry.data_size as usize {
            warn!(
                "Entry {}{} declares {} bytes at offset {} but only {} are present",
                entry.tag_name(),
                entry.number,
                entry.data_size,
                entry.data_offset,
                data.len()
            );
        }
        data
    }

    /// Read `count` 2-byte samples from a located entry
    fn u16_array(&self, tag: &[u8; 4], id: u8) -> Vec<u16> {
        match self.locate(tag, id) {
            Some(entry) => {
                read_be_u16_run(self.entry_data(&entry), 0, entry.element_count as usize)
            }
            None => Vec::new(),
        }
    }

    /// Read a byte array entry, limited to its element count
    fn byte_array(&self, tag: &[u8; 4], id: u8) -> Vec<u8> {
        match self.locate(tag, id) {
            Some(entry) => {
                let data = self.entry_data(&entry);
                let count = (entry.element_count as usize).min(data.len());
                data[..count].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Analyzed samples for a channel (`DATA` 9-12, or 205 for the fifth dye)
    pub fn analyzed_trace(&self, channel: Channel) -> Vec<u16> {
        self.u16_array(b"DATA", channel.analyzed_data_id())
    }

    /// Raw samples for a channel (`DATA` 1-4, or 105 for the fifth dye)
    pub fn raw_trace(&self, channel: Channel) -> Vec<u16> {
        self.u16_array(b"DATA", channel.raw_data_id())
    }

    /// Whether either fifth-dye data block exists
    pub fn has_fifth_channel(&self) -> bool {
        self.locate(b"DATA", Channel::Dye5.analyzed_data_id()).is_some()
            || self.locate(b"DATA", Channel::Dye5.raw_data_id()).is_some()
    }

    /// Bases of one call set (`PBAS`)
    pub fn bases(&self, set: BaseCallSet) -> Vec<u8> {
        self.byte_array(b"PBAS", set.abif_id())
    }

    /// Quality values of one call set (`PCON`)
    pub fn qualities(&self, set: BaseCallSet) -> Vec<u8> {
        self.byte_array(b"PCON", set.abif_id())
    }

    /// Peak locations of one call set (`PLOC`)
    ///
    /// Stored as 2-byte values by most instruments; 4-byte elements are also
    /// accepted.
    pub fn peak_locations(&self, set: BaseCallSet) -> Vec<u32> {
        let Some(entry) = self.locate(b"PLOC", set.abif_id()) else {
            return Vec::new();
        };
        let data = self.entry_data(&entry);
        let count = entry.element_count as usize;

        if entry.element_size == 4 {
            data.chunks_exact(4)
                .take(count)
                .filter_map(|chunk| read_be_u32(chunk, 0))
                .collect()
        } else {
            read_be_u16_run(data, 0, count)
                .into_iter()
                .map(u32::from)
                .collect()
        }
    }

    /// Filter-wheel order (`FWO_`): the base carried by channels 1-4
    pub fn base_order(&self) -> Option<[u8; 4]> {
        let entry = self.locate(b"FWO_", 1)?;
        let data = self.entry_data(&entry);
        let order: [u8; 4] = data.get(..4)?.try_into().ok()?;
        order
            .iter()
            .all(u8::is_ascii_alphabetic)
            .then(|| order.map(|b| b.to_ascii_uppercase()))
    }

    /// Sample name (`SMPL` 1), if present
    pub fn sample_name(&self) -> Option<String> {
        self.string_entry(b"SMPL", 1)
    }

    /// Read a Pascal- or C-string entry
    pub fn string_entry(&self, tag: &[u8; 4], id: u8) -> Option<String> {
        let entry = self.locate(tag, id)?;
        let data = self.entry_data(&entry);
        let text = match entry.element_type {
            PSTRING_TYPE => {
                let len = read_u8(data, 0)? as usize;
                clamped_region(data, 1, len)
            }
            CSTRING_TYPE => data.split(|&b| b == 0).next().unwrap_or_default(),
            _ => data,
        };
        Some(String::from_utf8_lossy(text).into_owned())
    }
}
