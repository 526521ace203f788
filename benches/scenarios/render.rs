//! Benchmarks for the renderer mixing live voices into interleaved output.

use std::{hint::black_box, sync::Arc};

use ambience::{graph::VoiceGraph, AudioBuffer, GeneratorSettings, CATALOG};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    let settings = GeneratorSettings {
        duration_secs: 1.0,
        ..GeneratorSettings::default()
    };
    let buffers: Vec<_> = CATALOG
        .iter()
        .map(|sound| {
            let buffer = AudioBuffer::generate(sound.model, &settings, 48_000, 7);
            (sound.id, Arc::new(buffer))
        })
        .collect();

    for voices in [1, 3, CATALOG.len()] {
        let (mut graph, mut renderer) = VoiceGraph::new(0.8, 16);
        for (id, buffer) in buffers.iter().take(voices) {
            graph
                .start(id, buffer.clone(), 0.6)
                .expect("render queue sized for the catalog");
        }

        for &size in BLOCK_SIZES {
            let mut out = vec![0.0f32; size * 2];
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| b.iter(|| renderer.render(black_box(&mut out), 2)),
            );
        }
    }

    group.finish();
}
