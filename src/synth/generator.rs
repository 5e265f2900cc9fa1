//! The two seams between the voice engine and a unit's sound design.
//!
//! The engine never inspects samples. It asks an envelope whether it is still
//! audible and tells an oscillator what pitch to play; everything else is up
//! to the implementor.

use crate::dsp::envelope::Envelope;

/// Amplitude envelope driven by the trigger controller.
pub trait EnvelopeGenerator: Send {
    /// Gate high: start from the attack.
    fn note_on(&mut self);
    /// Gate low: release from the current level.
    fn note_off(&mut self);
    /// Drop to silence immediately. Always followed by `note_on` on a hard retrigger.
    fn reset(&mut self);
    /// False once the release has finished; the voice is then free.
    fn is_active(&self) -> bool;
    fn next_sample(&mut self) -> f32;
    fn level(&self) -> f32;
}

/// Anything that produces a signal at a settable pitch.
pub trait PitchedGenerator: Send {
    /// May be called every sample while a glide runs. Must not reset phase.
    fn set_frequency(&mut self, hz: f32);
    fn next_sample(&mut self) -> f32;
}

impl EnvelopeGenerator for Envelope {
    fn note_on(&mut self) {
        Envelope::note_on(self);
    }

    fn note_off(&mut self) {
        Envelope::note_off(self);
    }

    fn reset(&mut self) {
        Envelope::reset(self);
    }

    fn is_active(&self) -> bool {
        Envelope::is_active(self)
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        Envelope::next_sample(self)
    }

    fn level(&self) -> f32 {
        Envelope::level(self)
    }
}

impl<E: EnvelopeGenerator + ?Sized> EnvelopeGenerator for Box<E> {
    fn note_on(&mut self) {
        (**self).note_on();
    }

    fn note_off(&mut self) {
        (**self).note_off();
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn next_sample(&mut self) -> f32 {
        (**self).next_sample()
    }

    fn level(&self) -> f32 {
        (**self).level()
    }
}

impl<G: PitchedGenerator + ?Sized> PitchedGenerator for Box<G> {
    fn set_frequency(&mut self, hz: f32) {
        (**self).set_frequency(hz);
    }

    fn next_sample(&mut self) -> f32 {
        (**self).next_sample()
    }
}
