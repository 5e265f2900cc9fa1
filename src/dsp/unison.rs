use crate::dsp::mix::{equal_power_gain, pan_gains};
use crate::synth::generator::PitchedGenerator;

/*
Unison Stack
============

Unison mode plays one note on a stack of detuned copies of the same
oscillator. The stack is driven by voice 0: the engine feeds it voice 0's
(possibly gliding) pitch every sample and multiplies its output by voice 0's
envelope.

Detune Spread
-------------

The centre oscillator is untuned. The others come in +/- pairs whose distance
grows by the golden ratio:

    index   0     1       2       3          4          5          6
    cents   0    +d      -d     +d*phi     -d*phi     +d*phi^2   -d*phi^2

phi is irrational, so no two detune offsets are small-integer multiples of
each other and the beating between pairs never lines up into an obvious
periodic wobble.

Stereo Spread
-------------

Oscillator i sits at pan = cos(i * golden_angle) * spread, with
golden_angle = 2*pi*(1 - 1/phi). The centre oscillator lands hard to one side
at full spread, the rest scatter without clumping.

The summed stack is scaled by 1/sqrt(count) so changing the number of
oscillators does not change the perceived level.
*/

pub const MIN_UNISON_VOICES: usize = 3;
pub const MAX_UNISON_VOICES: usize = 7;

const GOLDEN_RATIO: f32 = 1.618_034;

pub struct UnisonStack<G> {
    oscillators: Vec<G>,
    ratios: [f32; MAX_UNISON_VOICES],
    pans: [(f32, f32); MAX_UNISON_VOICES],
    detune_cents: f32,
    spread: f32,
    gain: f32,
}

impl<G: PitchedGenerator> UnisonStack<G> {
    /// Build a stack of `count` oscillators, clamped to an odd number in 3..=7.
    ///
    /// `make` is called once per oscillator; this is the only allocation.
    pub fn new(count: usize, detune_cents: f32, spread: f32, mut make: impl FnMut(usize) -> G) -> Self {
        let count = clamp_voice_count(count);
        let oscillators = (0..count).map(&mut make).collect();

        let mut stack = Self {
            oscillators,
            ratios: [1.0; MAX_UNISON_VOICES],
            pans: [(1.0, 1.0); MAX_UNISON_VOICES],
            detune_cents,
            spread: spread.clamp(0.0, 1.0),
            gain: equal_power_gain(count),
        };
        stack.compute_ratios();
        stack.compute_pans();
        stack
    }

    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    pub fn set_detune(&mut self, cents: f32) {
        self.detune_cents = cents.clamp(0.0, 100.0);
        self.compute_ratios();
    }

    pub fn set_spread(&mut self, spread: f32) {
        self.spread = spread.clamp(0.0, 1.0);
        self.compute_pans();
    }

    /// Frequency multiplier applied to oscillator `index`.
    pub fn ratio(&self, index: usize) -> Option<f32> {
        self.ratios[..self.oscillators.len()].get(index).copied()
    }

    /// Produce one stereo sample at `hz` (the centre pitch).
    #[inline]
    pub fn next_sample(&mut self, hz: f32) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;

        for (i, osc) in self.oscillators.iter_mut().enumerate() {
            osc.set_frequency(hz * self.ratios[i]);
            let sample = osc.next_sample();
            let (gain_l, gain_r) = self.pans[i];
            left += sample * gain_l;
            right += sample * gain_r;
        }

        (left * self.gain, right * self.gain)
    }

    fn compute_ratios(&mut self) {
        self.ratios[0] = 1.0;

        let mut power = 1.0;
        let mut i = 1;
        while i < self.oscillators.len() {
            let cents = self.detune_cents * power;
            self.ratios[i] = cents_to_ratio(cents);
            if i + 1 < self.oscillators.len() {
                self.ratios[i + 1] = cents_to_ratio(-cents);
            }
            power *= GOLDEN_RATIO;
            i += 2;
        }
    }

    fn compute_pans(&mut self) {
        let golden_angle = std::f32::consts::TAU * (1.0 - 1.0 / GOLDEN_RATIO);
        for i in 0..self.oscillators.len() {
            let pan = (i as f32 * golden_angle).cos() * self.spread;
            self.pans[i] = pan_gains(pan);
        }
    }
}

fn clamp_voice_count(count: usize) -> usize {
    let count = count.clamp(MIN_UNISON_VOICES, MAX_UNISON_VOICES);
    if count % 2 == 0 {
        count + 1
    } else {
        count
    }
}

#[inline]
fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}
