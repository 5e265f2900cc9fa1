use crate::dsp::glide::Glide;
use crate::dsp::unison::UnisonStack;
use crate::synth::generator::{EnvelopeGenerator, PitchedGenerator};

/// Generator state of one voice: what the trigger controller mutates and the
/// render dispatcher plays.
///
/// The allocator's [`VoiceSlot`](crate::engine::VoiceSlot) says which note a
/// voice belongs to; this says what it currently sounds like.
pub struct Voice<G, E> {
    oscillator: G,
    envelope: E,
    glide: Glide,
    gain: f32,
    gate: bool,
}

impl<G: PitchedGenerator, E: EnvelopeGenerator> Voice<G, E> {
    pub fn new(oscillator: G, envelope: E) -> Self {
        Self {
            oscillator,
            envelope,
            glide: Glide::new(),
            gain: 0.0,
            gate: false,
        }
    }

    /// Start (or restart) the envelope at `gain`. Pitch must already be set.
    pub(crate) fn start(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
        self.gate = true;
        self.envelope.reset();
        self.envelope.note_on();
    }

    /// Gate low. The envelope rings out on its own.
    pub fn release(&mut self) {
        if self.gate {
            self.gate = false;
            self.envelope.note_off();
        }
    }

    /// Hard stop: gate low and envelope straight to idle.
    pub fn silence(&mut self) {
        self.gate = false;
        self.envelope.reset();
    }

    /// Key held, or the envelope still audible.
    pub fn is_sounding(&self) -> bool {
        self.gate || self.envelope.is_active()
    }

    pub fn gate(&self) -> bool {
        self.gate
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn pitch_hz(&self) -> f32 {
        self.glide.current_hz()
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn glide(&self) -> &Glide {
        &self.glide
    }

    pub(crate) fn glide_mut(&mut self) -> &mut Glide {
        &mut self.glide
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let hz = self.glide.next_sample();
        self.oscillator.set_frequency(hz);
        self.oscillator.next_sample() * self.envelope.next_sample() * self.gain
    }

    /// Overwrite `out` with this voice's signal.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Play a detuned stack at this voice's pitch, shaped by this voice's envelope.
    ///
    /// The voice's own oscillator is left untouched.
    pub fn render_unison(&mut self, stack: &mut UnisonStack<G>, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let hz = self.glide.next_sample();
            let amp = self.envelope.next_sample() * self.gain;
            let (stack_l, stack_r) = stack.next_sample(hz);
            *l = stack_l * amp;
            *r = stack_r * amp;
        }
    }
}
