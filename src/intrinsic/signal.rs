use log::warn;

use super::peak::{channel_of, IntrinsicPeak, PeakShape};

/// Upper bound on the length of a cumulative signal array
///
/// Positions come from text, so a single corrupt record could otherwise request
/// an arbitrarily large allocation. Samples beyond the bound are dropped like
/// any other out-of-range sample.
pub const MAX_SIGNAL_LENGTH: usize = 1 << 20;

/// Per-channel sums of intrinsic peaks on a shared, shifted x axis
///
/// Index `i` of every channel corresponds to x position `i - shift`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CumulativeSignal {
    shift: i64,
    channels: [Vec<f64>; 4],
}

impl CumulativeSignal {
    /// Sum every peak into its channel's array
    ///
    /// The shift is taken from the first peak (`max(0, -begin)`), and the
    /// arrays span `0..=max_x + shift`. Peaks whose base is not A, C, G or T
    /// contribute nothing; samples that land outside the arrays are dropped.
    pub fn build(peaks: &[IntrinsicPeak]) -> Self {
        let Some(first) = peaks.first() else {
            return Self::default();
        };
        let shift = 0i64.saturating_sub(first.begin()).max(0);

        let max_x = peaks
            .iter()
            .filter(|p| p.width() > 0)
            .map(|p| p.end() - 1)
            .max();

        let len = match max_x {
            Some(max_x) if max_x.saturating_add(shift) >= 0 => {
                let wanted = max_x.saturating_add(shift).saturating_add(1);
                let wanted = usize::try_from(wanted).unwrap_or(usize::MAX);
                if wanted > MAX_SIGNAL_LENGTH {
                    warn!(
                        "Cumulative signal of {} samples exceeds the limit of {}; truncating",
                        wanted, MAX_SIGNAL_LENGTH
                    );
                }
                wanted.min(MAX_SIGNAL_LENGTH)
            }
            _ => 0,
        };

        let mut channels: [Vec<f64>; 4] = Default::default();
        for channel in channels.iter_mut() {
            channel.resize(len, 0.0);
        }

        for peak in peaks {
            let Some(index) = peak.channel() else {
                continue;
            };
            let signal = &mut channels[index];
            for (x, &y) in peak.x_range().zip(peak.values()) {
                let shifted = x.saturating_add(shift);
                if let Ok(i) = usize::try_from(shifted) {
                    if let Some(slot) = signal.get_mut(i) {
                        *slot += y;
                    }
                }
            }
        }

        Self { shift, channels }
    }

    /// Offset added to x positions to obtain array indices
    pub fn shift(&self) -> i64 {
        self.shift
    }

    /// Array length shared by all channels
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Whether the arrays are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed signal of one channel (0-3)
    pub fn channel(&self, index: usize) -> &[f64] {
        self.channels.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Summed signal for a base
    pub fn for_base(&self, base: char) -> &[f64] {
        match channel_of(base) {
            Some(index) => self.channel(index),
            None => &[],
        }
    }

    /// All four channel slices, in channel order
    pub fn slices(&self) -> Vec<&[f64]> {
        self.channels.iter().map(Vec::as_slice).collect()
    }

    /// X position of an array index
    pub fn x_of(&self, index: usize) -> i64 {
        (index as i64).saturating_sub(self.shift)
    }
}
