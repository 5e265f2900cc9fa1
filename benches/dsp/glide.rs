//! Benchmarks for log-domain portamento.
//!
//! A glide recomputes `exp` every sample, so this is the per-voice cost of
//! portamento on top of a held note.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicebank::dsp::glide::Glide;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_glide(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/glide");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut steady = Glide::new();
        steady.set_immediate(220.0);
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| {
                for hz in buffer.iter_mut() {
                    *hz = steady.next_sample();
                }
                black_box(&buffer);
            })
        });

        group.bench_with_input(BenchmarkId::new("gliding", size), &size, |b, _| {
            let mut glide = Glide::new();
            b.iter(|| {
                glide.set_immediate(220.0);
                glide.glide_to(880.0, 10.0, SAMPLE_RATE);
                for hz in buffer.iter_mut() {
                    *hz = glide.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
