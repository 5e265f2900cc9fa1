//! Cost of note events alone: allocation, stealing and triggering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicebank::engine::AllocatorCore;
use voicebank::{AllocationStrategy, BasicEngine, EngineConfig, VoiceMode};

const STRATEGIES: [(&str, AllocationStrategy); 4] = [
    ("round_robin", AllocationStrategy::RoundRobin),
    ("oldest_note", AllocationStrategy::OldestNote),
    ("first_available", AllocationStrategy::FirstAvailable),
    ("release_first", AllocationStrategy::ReleaseFirst),
];

pub fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/allocation");

    // Pool permanently full, so every note-on steals.
    for (name, strategy) in STRATEGIES {
        let mut core = AllocatorCore::new(16);
        core.set_mode(VoiceMode::Polyphonic);
        core.set_allocation_strategy(strategy);
        for note in 0..16 {
            core.note_on(40 + note, 100);
        }

        let mut note = 0u8;
        group.bench_function(BenchmarkId::new("steal", name), |b| {
            b.iter(|| {
                note = (note + 1) % 64;
                black_box(core.note_on(black_box(40 + note), 100));
            })
        });
    }

    let mut mono = AllocatorCore::new(1);
    mono.set_mode(VoiceMode::Monophonic);
    group.bench_function("mono_trill", |b| {
        b.iter(|| {
            mono.note_on(black_box(60), 100);
            mono.note_on(black_box(62), 100);
            black_box(mono.note_off(62));
            black_box(mono.note_off(60));
        })
    });

    let mut engine = BasicEngine::from_config(&EngineConfig {
        max_voices: 7,
        ..EngineConfig::default()
    })
    .unwrap();
    let mut left = [0.0f32; 64];
    let mut right = [0.0f32; 64];
    group.bench_function("engine_chord_block", |b| {
        b.iter(|| {
            for note in [48, 52, 55, 59, 62] {
                engine.note_on(note, 100);
            }
            engine.render(&mut left, &mut right);
            for note in [48, 52, 55, 59, 62] {
                engine.note_off(note);
            }
            black_box(&left);
        })
    });

    group.finish();
}
