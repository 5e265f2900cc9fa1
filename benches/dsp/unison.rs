//! Benchmarks for the detuned unison stack.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use voicebank::dsp::oscillator::{Oscillator, OscillatorWaveform};
use voicebank::dsp::unison::UnisonStack;
use voicebank::dsp::wavetable::{Wavetable, DEFAULT_TABLE_SIZE};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_unison(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/unison");
    let table = Arc::new(Wavetable::sine(DEFAULT_TABLE_SIZE));

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for count in [3, 5, 7] {
            let mut stack = UnisonStack::new(count, 12.0, 0.8, |_| {
                Oscillator::new(OscillatorWaveform::Saw, Arc::clone(&table), SAMPLE_RATE)
            });

            group.bench_with_input(BenchmarkId::new(format!("saw_x{count}"), size), &size, |b, _| {
                b.iter(|| {
                    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                        (*l, *r) = stack.next_sample(black_box(110.0));
                    }
                    black_box((&left, &right));
                })
            });
        }
    }

    group.finish();
}
