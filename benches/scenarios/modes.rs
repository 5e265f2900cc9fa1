//! Render cost of each voice mode with the pool busy.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicebank::{BasicEngine, EngineConfig, VoiceMode};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn engine(mode: VoiceMode, max_voices: usize) -> BasicEngine {
    let mut config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        max_voices,
        mode,
        portamento_ms: 200.0,
        ..EngineConfig::default()
    };
    // A release longer than any benchmark run keeps every voice sounding.
    config.envelope.release = 60.0;
    BasicEngine::from_config(&config).unwrap()
}

pub fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/modes");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut mono = engine(VoiceMode::Monophonic, 4);
        mono.note_on(48, 100);
        mono.note_on(60, 100); // glide running
        group.bench_with_input(BenchmarkId::new("mono_glide", size), &size, |b, _| {
            b.iter(|| mono.render(black_box(&mut left), black_box(&mut right)))
        });

        let mut unison = engine(VoiceMode::Unison, 4);
        unison.note_on(45, 100);
        group.bench_with_input(BenchmarkId::new("unison_x5", size), &size, |b, _| {
            b.iter(|| unison.render(black_box(&mut left), black_box(&mut right)))
        });

        for voices in [4, 7, 16] {
            let mut poly = engine(VoiceMode::Polyphonic, voices);
            for i in 0..voices {
                poly.note_on(48 + (i as u8) * 3, 100);
            }
            group.bench_with_input(
                BenchmarkId::new(format!("poly_{voices}_voices"), size),
                &size,
                |b, _| b.iter(|| poly.render(black_box(&mut left), black_box(&mut right))),
            );
        }

        let mut idle = engine(VoiceMode::Polyphonic, 7);
        group.bench_with_input(BenchmarkId::new("poly_idle", size), &size, |b, _| {
            b.iter(|| idle.render(black_box(&mut left), black_box(&mut right)))
        });
    }

    group.finish();
}
