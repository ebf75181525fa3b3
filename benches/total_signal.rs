use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use chromatrace::intrinsic::IntrinsicPeakModel;

/// One record pair per base, spaced about 12 samples apart like a real run
fn generate_peak_stream(num_peaks: usize) -> String {
    let bases = ['A', 'C', 'G', 'T'];
    let mut text = String::from(">benchmark run\n");

    for i in 0..num_peaks {
        let base = bases[(i * 7) % 4];
        let position = 20 + i * 12;
        let half_width = 6 + i % 4;
        text.push_str(&format!("{} {} {} 0 0 0 0\n", base, position, half_width));

        let magnitudes: Vec<String> = (0..half_width)
            .map(|k| format!("{:.1}", 800.0 / (1.0 + k as f64 * k as f64)))
            .collect();
        text.push_str(&magnitudes.join(" "));
        text.push('\n');
    }
    text
}

fn bench_parse_and_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("intrinsic_model");

    for num_peaks in [100, 1_000, 5_000] {
        let text = generate_peak_stream(num_peaks);

        group.throughput(Throughput::Elements(num_peaks as u64));
        group.bench_with_input(BenchmarkId::new("parse", num_peaks), &text, |b, text| {
            b.iter(|| {
                let model: IntrinsicPeakModel = text.parse().unwrap();
                black_box(model.total_signal_peaks().len());
            });
        });

        let model: IntrinsicPeakModel = text.parse().unwrap();
        let peaks = model.peaks().to_vec();
        group.bench_with_input(BenchmarkId::new("scan", num_peaks), &peaks, |b, peaks| {
            b.iter(|| {
                let model = IntrinsicPeakModel::from_peaks(peaks.clone());
                black_box(model.total_signal_peaks().len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_and_scan);
criterion_main!(benches);
