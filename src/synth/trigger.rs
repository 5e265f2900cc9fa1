use crate::io::converter::note_to_freq;
use crate::synth::generator::{EnvelopeGenerator, PitchedGenerator};
use crate::synth::voice::Voice;

/*
Triggering a Voice
==================

The allocator decides WHICH voice plays a note. The trigger controller decides
HOW that voice gets there. Three outcomes:

  Glide       allow_legato, the voice is still sounding, portamento > 0 and
              the voice has a previous pitch. Pitch slides in log-frequency
              over exactly round(portamento * sample_rate) samples. The
              envelope keeps running, nothing is re-attacked.

  Legato      allow_legato and the voice is still sounding, but no
              portamento. Pitch jumps, the envelope keeps running.

  Retrigger   Everything else. Pitch jumps, gain takes the new velocity, the
              envelope is reset to zero and attacks again.

"Still sounding" means gate high or envelope not yet idle. A mono key pressed
during the previous note's release tail glides out of that tail; the envelope
is left where it is, releasing.

Oscillator phase is never touched; see the oscillator notes.
*/

/// Longest accepted portamento time.
pub const MAX_PORTAMENTO_MS: f32 = 10_000.0;

/// Reference pitch of A4 unless configured otherwise.
pub const DEFAULT_REFERENCE_HZ: f32 = 440.0;

/// What a trigger did to the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Glide,
    Legato,
    Retrigger,
}

#[derive(Debug, Clone)]
pub struct TriggerController {
    sample_rate: f32,
    portamento_ms: f32,
    reference_hz: f32,
}

impl TriggerController {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            portamento_ms: 0.0,
            reference_hz: DEFAULT_REFERENCE_HZ,
        }
    }

    /// Glide time for legato transitions, clamped to `0..=10_000` ms.
    pub fn set_portamento_time(&mut self, ms: f32) {
        self.portamento_ms = if ms.is_finite() {
            ms.clamp(0.0, MAX_PORTAMENTO_MS)
        } else {
            0.0
        };
    }

    pub fn portamento_time(&self) -> f32 {
        self.portamento_ms
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frequency of A4. Non-positive values are ignored.
    pub fn set_reference_pitch(&mut self, hz: f32) {
        if hz > 0.0 && hz.is_finite() {
            self.reference_hz = hz;
        }
    }

    pub fn reference_pitch(&self) -> f32 {
        self.reference_hz
    }

    pub fn target_hz(&self, note: u8) -> f32 {
        note_to_freq(note, self.reference_hz)
    }

    /// Move `voice` onto `note`. `velocity` is already normalised to `0.0..=1.0`.
    pub fn trigger_voice<G, E>(
        &self,
        voice: &mut Voice<G, E>,
        note: u8,
        velocity: f32,
        allow_legato: bool,
    ) -> Transition
    where
        G: PitchedGenerator,
        E: EnvelopeGenerator,
    {
        let target_hz = self.target_hz(note);
        let legato = allow_legato && voice.is_sounding();

        if legato {
            if self.portamento_ms > 0.0 && voice.glide().has_pitch() {
                let seconds = self.portamento_ms / 1000.0;
                voice.glide_mut().glide_to(target_hz, seconds, self.sample_rate);
                return Transition::Glide;
            }

            voice.glide_mut().set_immediate(target_hz);
            return Transition::Legato;
        }

        voice.glide_mut().set_immediate(target_hz);
        voice.start(velocity);
        Transition::Retrigger
    }
}
