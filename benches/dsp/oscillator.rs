//! Benchmarks for the free-running oscillator.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use voicebank::dsp::oscillator::{Oscillator, OscillatorWaveform};
use voicebank::dsp::wavetable::{Wavetable, DEFAULT_TABLE_SIZE};
use voicebank::synth::generator::PitchedGenerator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let table = Arc::new(Wavetable::sine(DEFAULT_TABLE_SIZE));

    let waveforms = [
        ("sine_table", OscillatorWaveform::Sine),
        ("saw_polyblep", OscillatorWaveform::Saw),
        ("square_polyblep", OscillatorWaveform::Square),
        ("triangle", OscillatorWaveform::Triangle),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(waveform, Arc::clone(&table), SAMPLE_RATE);
            osc.set_frequency(440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample();
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
