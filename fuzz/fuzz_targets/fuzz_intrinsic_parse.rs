#![no_main]

use libfuzzer_sys::fuzz_target;

use chromatrace::intrinsic::IntrinsicPeakModel;

fuzz_target!(|data: &[u8]| {
    // Header errors are expected; panics and unbounded allocations are not
    if let Ok(model) = IntrinsicPeakModel::parse(data) {
        assert!(model.total_signal_peaks().len() <= model.peaks().len());
    }
});
