//! Benchmarks for synthesizing one second of each model.

use std::hint::black_box;

use ambience::{AudioBuffer, EventShaping, GeneratorSettings, SoundModel};
use criterion::{BenchmarkId, Criterion};

pub fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/models");
    group.sample_size(20);

    for shaping in [EventShaping::SingleSample, EventShaping::Sustained] {
        let settings = GeneratorSettings {
            duration_secs: 1.0,
            channels: 2,
            shaping,
        };

        for model in SoundModel::ALL {
            let name = format!("{model:?}/{shaping:?}");
            group.bench_with_input(BenchmarkId::new(name, 48_000), &model, |b, &model| {
                b.iter(|| AudioBuffer::generate(black_box(model), &settings, 48_000, 1))
            });
        }
    }

    group.finish();
}
