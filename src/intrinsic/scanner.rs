//! Round-robin segmentation of per-channel cumulative signal
//!
//! Each channel keeps its own cursor. In every round each channel extracts at
//! most one contiguous positive run starting at or after its cursor, then moves
//! the cursor past it. Runs are cut at [`MAX_PEAK_WIDTH`] samples to bound the
//! cost of drawing them.

use std::ops::Range;

/// Widest run the scanner emits as one peak
pub const MAX_PEAK_WIDTH: usize = 100;

/// A run found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRun {
    /// Channel the run belongs to
    pub channel: usize,
    /// Index range in the channel's signal
    pub range: Range<usize>,
}

/// Cursor-based scanner over a fixed set of channel signals
#[derive(Debug)]
pub struct PeakScanner<'a> {
    signals: Vec<&'a [f64]>,
    cursors: Vec<usize>,
}

impl<'a> PeakScanner<'a> {
    /// Create a scanner with every cursor at 0
    pub fn new(signals: Vec<&'a [f64]>) -> Self {
        let cursors = vec![0; signals.len()];
        Self { signals, cursors }
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.signals.len()
    }

    /// Current cursor of a channel
    pub fn cursor(&self, channel: usize) -> Option<usize> {
        self.cursors.get(channel).copied()
    }

    /// Extract the next run of a channel and advance its cursor
    ///
    /// The run starts at the first positive sample at or after the cursor and
    /// ends before the next non-positive sample, after [`MAX_PEAK_WIDTH`]
    /// samples, or at the end of the signal. When no positive sample remains
    /// the cursor is parked at the signal length.
    pub fn next_run(&mut self, channel: usize) -> Option<Range<usize>> {
        let signal = *self.signals.get(channel)?;
        let cursor = self.cursors[channel];

        let Some(start) = (cursor..signal.len()).find(|&i| signal[i] > 0.0) else {
            self.cursors[channel] = signal.len();
            return None;
        };

        let limit = start.saturating_add(MAX_PEAK_WIDTH).min(signal.len());
        let end = (start..limit)
            .find(|&i| signal[i] <= 0.0)
            .unwrap_or(limit);

        self.cursors[channel] = end;
        Some(start..end)
    }

    /// Run rounds until one yields nothing or `limit` runs were found
    pub fn scan(mut self, limit: usize) -> Vec<ScannedRun> {
        let mut runs = Vec::new();
        if limit == 0 {
            return runs;
        }

        loop {
            let mut found_in_round = 0;
            for channel in 0..self.signals.len() {
                if let Some(range) = self.next_run(channel) {
                    runs.push(ScannedRun { channel, range });
                    found_in_round += 1;
                    if runs.len() >= limit {
                        return runs;
                    }
                }
            }
            if found_in_round == 0 {
                return runs;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_run() {
        let signal = [0.0, 0.0, 5.0, 7.0, 0.0];
        let mut scanner = PeakScanner::new(vec![&signal[..]]);
        assert_eq!(scanner.next_run(0), Some(2..4));
        assert_eq!(scanner.cursor(0), Some(4));
        assert_eq!(scanner.next_run(0), None);
        assert_eq!(scanner.cursor(0), Some(5));
    }

    #[test]
    fn test_run_to_end_of_signal() {
        let signal = [0.0, 1.0, 2.0];
        let mut scanner = PeakScanner::new(vec![&signal[..]]);
        assert_eq!(scanner.next_run(0), Some(1..3));
        assert_eq!(scanner.next_run(0), None);
    }

    #[test]
    fn test_width_cap_splits_long_runs() {
        let signal = vec![1.0; 250];
        let runs = PeakScanner::new(vec![&signal[..]]).scan(usize::MAX);
        let ranges: Vec<_> = runs.into_iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![0..100, 100..200, 200..250]);
    }

    #[test]
    fn test_all_zero_terminates() {
        let zeros = vec![0.0; 1000];
        let runs = PeakScanner::new(vec![&zeros[..], &zeros[..], &zeros[..], &zeros[..]]).scan(usize::MAX);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_round_robin_order() {
        let a = [1.0, 0.0, 1.0];
        let c = [0.0, 2.0, 0.0];
        let runs = PeakScanner::new(vec![&a[..], &c[..]]).scan(usize::MAX);
        let order: Vec<_> = runs.iter().map(|r| (r.channel, r.range.clone())).collect();
        assert_eq!(order, vec![(0, 0..1), (1, 1..2), (0, 2..3)]);
    }

    #[test]
    fn test_limit_truncates() {
        let a = [1.0, 0.0, 1.0, 0.0, 1.0];
        let runs = PeakScanner::new(vec![&a[..]]).scan(2);
        assert_eq!(runs.len(), 2);
        assert!(PeakScanner::new(vec![&a[..]]).scan(0).is_empty());
    }

    #[test]
    fn test_negative_values_end_runs() {
        let signal = [3.0, -1.0, 2.0];
        let runs = PeakScanner::new(vec![&signal[..]]).scan(usize::MAX);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].range, 2..3);
    }
}
