//! Numeric decoding primitives shared by the container formats
//!
//! Both chromatogram formats store every multi-byte integer big-endian. SCF
//! version 3 additionally compresses trace samples with a second-order delta
//! encoding, which is undone here by two cascaded modular prefix sums.
//!
//! All readers in this module are bounds-checked and return `None` (or a
//! truncated run) instead of panicking on short buffers.

use byteorder::{BigEndian, ByteOrder};

/// Number of prefix-sum passes applied by the delta decoders.
///
/// SCF 3.x encodes samples as second differences, so exactly two passes
/// restore the absolute values.
pub const DELTA_PASSES: usize = 2;

/// Widen an unsigned byte to a 32-bit value in `0..=255`.
#[inline]
pub const fn widen_u8(byte: u8) -> u32 {
    byte as u32
}

/// Compose a big-endian unsigned 32-bit integer from four bytes.
///
/// Composed in unsigned arithmetic, so offsets above `i32::MAX` stay positive.
#[inline]
pub const fn compose_be_u32(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    (widen_u8(b0) << 24) | (widen_u8(b1) << 16) | (widen_u8(b2) << 8) | widen_u8(b3)
}

/// Read a byte at `offset`.
#[inline]
pub fn read_u8(bytes: &[u8], offset: usize) -> Option<u8> {
    bytes.get(offset).copied()
}

/// Read a big-endian `u16` at `offset`.
#[inline]
pub fn read_be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    bytes.get(offset..end).map(BigEndian::read_u16)
}

/// Read a big-endian `u32` at `offset`.
#[inline]
pub fn read_be_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    bytes
        .get(offset..end)
        .map(|b| compose_be_u32(b[0], b[1], b[2], b[3]))
}

/// Clamp a `(offset, len)` byte region to the buffer.
///
/// Returns the available slice, which is shorter than `len` when the region
/// runs past the end of the buffer, and empty when `offset` itself is out of
/// range.
pub fn clamped_region(bytes: &[u8], offset: usize, len: usize) -> &[u8] {
    if offset >= bytes.len() {
        return &[];
    }
    let end = offset.saturating_add(len).min(bytes.len());
    &bytes[offset..end]
}

/// Read up to `count` big-endian `u16` samples starting at `offset`.
///
/// A region that runs past the end of the buffer yields only the complete
/// samples that are present.
pub fn read_be_u16_run(bytes: &[u8], offset: usize, count: usize) -> Vec<u16> {
    let region = clamped_region(bytes, offset, count.saturating_mul(2));
    let available = region.len() / 2;
    let mut samples = vec![0u16; available];
    BigEndian::read_u16_into(&region[..available * 2], &mut samples);
    samples
}

/// Read up to `count` single-byte samples starting at `offset`, widened to `u16`.
pub fn read_u8_run(bytes: &[u8], offset: usize, count: usize) -> Vec<u16> {
    clamped_region(bytes, offset, count)
        .iter()
        .map(|&b| b as u16)
        .collect()
}

/// Undo the SCF 3.x delta encoding for 1-byte samples, in place.
///
/// Each pass replaces `samples[i]` with `(samples[i] + samples[i-1]) mod 256`,
/// with the running sum restarted at zero.
pub fn delta_decode_1byte(samples: &mut [u8]) {
    for _ in 0..DELTA_PASSES {
        let mut previous = 0u8;
        for sample in samples.iter_mut() {
            *sample = sample.wrapping_add(previous);
            previous = *sample;
        }
    }
}

/// Undo the SCF 3.x delta encoding for 2-byte samples, in place.
///
/// Identical to [`delta_decode_1byte`] with modulus 65536.
pub fn delta_decode_2byte(samples: &mut [u16]) {
    for _ in 0..DELTA_PASSES {
        let mut previous = 0u16;
        for sample in samples.iter_mut() {
            *sample = sample.wrapping_add(previous);
            previous = *sample;
        }
    }
}

/// Apply the delta encoding that [`delta_decode_2byte`] undoes.
///
/// Used to build SCF 3.x fixtures in tests and benchmarks.
pub fn delta_encode_2byte(samples: &mut [u16]) {
    for _ in 0..DELTA_PASSES {
        let mut previous = 0u16;
        for sample in samples.iter_mut() {
            let current = *sample;
            *sample = current.wrapping_sub(previous);
            previous = current;
        }
    }
}
