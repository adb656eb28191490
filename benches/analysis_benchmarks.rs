
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vent_core::analysis::{derive_threshold, ContourAnalyzer, Cycle, CycleDetector, StatsAggregator};
use vent_core::config::{DetectionConfig, ScaleConfig};
use vent_core::model::{WaveformModel, WaveformTemplate};
use vent_core::source::Sample;

const BUFFER_SECONDS: &[usize] = &[10, 60, 300];
const SAMPLE_RATE_HZ: f64 = 100.0;

fn breath_buffer(seconds: usize) -> Vec<Sample> {
    let points = vec![
        Sample::new(0.0, 0.0),
        Sample::new(0.5, 20.0),
        Sample::new(1.0, 18.0),
        Sample::new(1.2, 2.0),
        Sample::new(2.0, 0.0),
    ];
    let mut model = WaveformModel::new(WaveformTemplate::from_points(points).unwrap());
    model
        .scale(ScaleConfig::new(30.0, 30.0, 5.0), false)
        .unwrap();

    let n = seconds * SAMPLE_RATE_HZ as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE_HZ;
            Sample::new(t, model.sample(t).unwrap())
        })
        .collect()
}

fn benchmark_model_sampling(c: &mut Criterion) {
    let points = vec![
        Sample::new(0.0, 0.0),
        Sample::new(0.5, 20.0),
        Sample::new(1.0, 18.0),
        Sample::new(1.2, 2.0),
        Sample::new(2.0, 0.0),
    ];
    let mut model = WaveformModel::new(WaveformTemplate::from_points(points).unwrap());
    model
        .scale(ScaleConfig::new(30.0, 30.0, 5.0), false)
        .unwrap();

    let mut group = c.benchmark_group("model_sampling");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("interpolated_reads", |b| {
        b.iter(|| {
            for i in 0..10_000 {
                let t = i as f64 * 0.01;
                let _ = black_box(model.sample(black_box(t)));
            }
        });
    });
    group.finish();
}

fn benchmark_cycle_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_detection");

    for &seconds in BUFFER_SECONDS {
        let buffer = breath_buffer(seconds);
        group.throughput(Throughput::Elements(buffer.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("detect", format!("{}s", seconds)),
            &buffer,
            |b, buffer| {
                let detector = CycleDetector::new(6.25);
                b.iter(|| detector.detect(black_box(buffer)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("derive_threshold", format!("{}s", seconds)),
            &buffer,
            |b, buffer| {
                b.iter(|| derive_threshold(black_box(buffer), 1.25));
            },
        );
    }
    group.finish();
}

fn benchmark_contour_analysis(c: &mut Criterion) {
    let buffer = breath_buffer(10);
    let detector = CycleDetector::new(6.25);
    let markers = detector.detect(&buffer);
    let cycles = detector.cycles(&markers);
    let analyzer = ContourAnalyzer::default();

    let mut group = c.benchmark_group("contour_analysis");
    group.bench_function("single_cycle", |b| {
        b.iter(|| analyzer.analyze(black_box(&buffer), black_box(cycles[0])));
    });
    group.finish();
}

fn benchmark_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");

    for &seconds in BUFFER_SECONDS {
        let buffer = breath_buffer(seconds);
        group.throughput(Throughput::Elements(buffer.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("aggregate", format!("{}s", seconds)),
            &buffer,
            |b, buffer| {
                b.iter(|| {
                    let mut stats = StatsAggregator::new(DetectionConfig::default());
                    stats.compute(black_box(buffer));
                    black_box(stats.take_records())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_model_sampling,
    benchmark_cycle_detection,
    benchmark_contour_analysis,
    benchmark_full_pass
);
criterion_main!(benches);
