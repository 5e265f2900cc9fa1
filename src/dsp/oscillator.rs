use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::wavetable::Wavetable;
use crate::synth::generator::PitchedGenerator;

/*
Free-running Oscillator
=======================

The voice engine never resets oscillator phase on a new note. A phase jump in
the middle of a waveform is a discontinuity, and a discontinuity is a click.
Only the envelope restarts; the oscillator keeps spinning and simply changes
speed when `set_frequency` is called (every sample while a glide is running).

  phase       Position within one cycle, [0, 1).
  increment   Cycles advanced per sample = frequency / sample_rate.

Saw and square use PolyBLEP: the naive edge is smoothed over one sample on
either side of the wrap, which removes most of the audible aliasing for the
price of a couple of multiplies.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    Sine,
    #[default]
    Saw,
    Square,
    Triangle,
}

pub struct Oscillator {
    waveform: OscillatorWaveform,
    table: Arc<Wavetable>,
    sample_rate: f32,
    phase: f32,
    increment: f32,
}

impl Oscillator {
    pub fn new(waveform: OscillatorWaveform, table: Arc<Wavetable>, sample_rate: f32) -> Self {
        Self {
            waveform,
            table,
            sample_rate: sample_rate.max(1.0),
            phase: 0.0,
            increment: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Start the cycle at a given phase. Used to decorrelate unison stacks.
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase.rem_euclid(1.0);
        self
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    fn advance(&mut self) {
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }
}

impl PitchedGenerator for Oscillator {
    #[inline]
    fn set_frequency(&mut self, hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        self.increment = hz.clamp(0.0, nyquist) / self.sample_rate;
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let t = self.phase;
        let dt = self.increment;

        let sample = match self.waveform {
            OscillatorWaveform::Sine => self.table.lookup(t),
            OscillatorWaveform::Saw => (2.0 * t - 1.0) - poly_blep(t, dt),
            OscillatorWaveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5).rem_euclid(1.0), dt)
            }
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
        };

        self.advance();
        sample
    }
}

/// Polynomial band-limited step correction around the phase wrap.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}
