use std::ops::Range;

use serde::Serialize;

/// Bases of the four signal channels, in channel order
pub const SIGNAL_BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Channel index (0-3) for a base character, case-insensitive
pub fn channel_of(base: char) -> Option<usize> {
    let upper = base.to_ascii_uppercase();
    SIGNAL_BASES.iter().position(|&b| b == upper)
}

/// Read-only view shared by intrinsic and total-signal peaks
///
/// A peak covers the contiguous x range `begin()..end()` with one y value per
/// position.
pub trait PeakShape {
    /// Base (channel) of the peak
    fn base(&self) -> char;

    /// First x position
    fn begin(&self) -> i64;

    /// y values, one per x position
    fn values(&self) -> &[f64];

    /// Number of x positions
    fn width(&self) -> usize {
        self.values().len()
    }

    /// One past the last x position
    fn end(&self) -> i64 {
        let width = i64::try_from(self.width()).unwrap_or(i64::MAX);
        self.begin().saturating_add(width)
    }

    /// The x positions
    fn x_range(&self) -> Range<i64> {
        self.begin()..self.end()
    }

    /// Channel index of the peak's base, if it is one of A, C, G, T
    fn channel(&self) -> Option<usize> {
        channel_of(self.base())
    }

    /// Position and height of the highest point
    fn apex(&self) -> Option<(i64, f64)> {
        self.values()
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &y)| match best {
                Some((_, top)) if top >= y => best,
                _ => Some((i, y)),
            })
            .map(|(i, y)| (self.begin().saturating_add(i as i64), y))
    }
}

/// A mirrored per-base peak reconstructed from one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrinsicPeak {
    base: char,
    position: i64,
    peak_type: i32,
    begin: i64,
    values: Vec<f64>,
}

impl IntrinsicPeak {
    /// Rebuild a symmetric peak from its right half
    ///
    /// `half[0]` is the height at `position` and `half[k]` the height `k`
    /// samples away on either side. With `n = half.len()` the peak spans
    /// `2n - 1` samples starting at `position - n + 1`.
    pub fn from_half(base: char, position: i64, half: &[f64], peak_type: i32) -> Self {
        let n = half.len();
        let width = (2 * n).saturating_sub(1);
        let mut values = vec![0.0; width];
        for (k, &magnitude) in half.iter().enumerate() {
            values[n - 1 + k] = magnitude;
            values[n - 1 - k] = magnitude;
        }

        Self {
            base,
            position,
            peak_type,
            begin: position.saturating_sub(n as i64).saturating_add(1),
            values,
        }
    }

    /// Build a peak from a record whose declared sample count may be zero or
    /// negative
    ///
    /// Non-positive counts give an empty peak whose `begin` still follows
    /// `position - count + 1`.
    pub(crate) fn from_record(
        base: char,
        position: i64,
        count: i64,
        half: &[f64],
        peak_type: i32,
    ) -> Self {
        if count > 0 {
            return Self::from_half(base, position, half, peak_type);
        }
        Self {
            base,
            position,
            peak_type,
            begin: position.saturating_sub(count).saturating_add(1),
            values: Vec::new(),
        }
    }

    /// Intrinsic (apex) position of the peak
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Type code from the record
    pub fn peak_type(&self) -> i32 {
        self.peak_type
    }
}

impl PeakShape for IntrinsicPeak {
    fn base(&self) -> char {
        self.base
    }

    fn begin(&self) -> i64 {
        self.begin
    }

    fn values(&self) -> &[f64] {
        &self.values
    }
}

/// A peak of the summed per-channel signal
///
/// Never wider than [`MAX_PEAK_WIDTH`](super::MAX_PEAK_WIDTH).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalSignalPeak {
    base: char,
    begin: i64,
    values: Vec<f64>,
}

impl TotalSignalPeak {
    pub(crate) fn new(base: char, begin: i64, values: Vec<f64>) -> Self {
        Self {
            base,
            begin,
            values,
        }
    }

    /// Sum of the peak's values
    pub fn area(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl PeakShape for TotalSignalPeak {
    fn base(&self) -> char {
        self.base
    }

    fn begin(&self) -> i64 {
        self.begin
    }

    fn values(&self) -> &[f64] {
        &self.values
    }
}
