use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sc_audio::features::{extract_clip, extractor_for};
use sc_core::config::{FeatureConfig, FeatureKind};

fn urban_clip(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * duration_secs) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.4 * (2.0 * std::f32::consts::PI * 310.0 * t).sin()
                + 0.2 * (2.0 * std::f32::consts::PI * 2900.0 * t).sin()
        })
        .collect()
}

fn bench_extract_clip(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_clip");
    // UrbanSound8K slices are at most 4 s.
    let clip = urban_clip(22050, 4.0);

    for kind in [FeatureKind::LogMel, FeatureKind::Mfcc] {
        let config = FeatureConfig::for_kind(kind);
        let mut extractor = extractor_for(&config);
        group.bench_with_input(
            BenchmarkId::new(format!("{kind:?}"), "4s@22050"),
            &clip,
            |b, clip| {
                b.iter(|| {
                    black_box(
                        extract_clip(clip, 22050, config.window_size(), extractor.as_mut())
                            .unwrap_or_default(),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_extract_clip);
criterion_main!(benches);
