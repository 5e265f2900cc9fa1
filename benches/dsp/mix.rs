//! Benchmarks for voice summing and equal-power scaling.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicebank::dsp::mix::{equal_power_gain, scale_in_place, sum_in_place};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];
        let voices: Vec<Vec<f32>> = (0..7)
            .map(|v| (0..size).map(|i| ((i + v) as f32 * 0.01).sin()).collect())
            .collect();

        group.bench_with_input(BenchmarkId::new("sum_7_voices", size), &size, |b, _| {
            b.iter(|| {
                out.fill(0.0);
                for voice in &voices {
                    sum_in_place(black_box(&mut out), black_box(voice));
                }
                scale_in_place(&mut out, equal_power_gain(voices.len()));
            })
        });
    }

    group.finish();
}
