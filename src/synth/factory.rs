use std::sync::Arc;

use crate::config::{AdsrConfig, EngineConfig};
use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{Oscillator, OscillatorWaveform};
use crate::dsp::wavetable::{Wavetable, DEFAULT_TABLE_SIZE};
use crate::synth::generator::{EnvelopeGenerator, PitchedGenerator};

/// Factory for the generators behind each voice.
///
/// This is the "instrument design" layer: configure the sound once, and the
/// engine calls the factory at construction time to fill its voice pool and
/// its unison stack. Never called from the audio thread.
pub trait VoiceFactory {
    type Oscillator: PitchedGenerator;
    type Envelope: EnvelopeGenerator;

    fn create_voice(&self) -> (Self::Oscillator, Self::Envelope);

    /// Oscillator for position `index` of the unison stack.
    fn create_unison_oscillator(&self, _index: usize) -> Self::Oscillator {
        self.create_voice().0
    }
}

impl<F, G, E> VoiceFactory for F
where
    F: Fn() -> (G, E),
    G: PitchedGenerator,
    E: EnvelopeGenerator,
{
    type Oscillator = G;
    type Envelope = E;

    fn create_voice(&self) -> (G, E) {
        self()
    }
}

/// Oscillator plus linear ADSR, sharing one sine table across every voice.
#[derive(Debug, Clone)]
pub struct BasicVoiceFactory {
    sample_rate: f32,
    waveform: OscillatorWaveform,
    envelope: AdsrConfig,
    table: Arc<Wavetable>,
}

impl BasicVoiceFactory {
    pub fn new(sample_rate: f32, waveform: OscillatorWaveform, envelope: AdsrConfig) -> Self {
        Self {
            sample_rate,
            waveform,
            envelope,
            table: Arc::new(Wavetable::sine(DEFAULT_TABLE_SIZE)),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.sample_rate, config.waveform, config.envelope)
    }

    pub fn table(&self) -> &Arc<Wavetable> {
        &self.table
    }
}

impl VoiceFactory for BasicVoiceFactory {
    type Oscillator = Oscillator;
    type Envelope = Envelope;

    fn create_voice(&self) -> (Oscillator, Envelope) {
        let AdsrConfig {
            attack,
            decay,
            sustain,
            release,
        } = self.envelope;

        (
            Oscillator::new(self.waveform, Arc::clone(&self.table), self.sample_rate),
            Envelope::adsr(self.sample_rate, attack, decay, sustain, release),
        )
    }

    /// Spread start phases by the golden ratio so the stack does not phase-align.
    fn create_unison_oscillator(&self, index: usize) -> Oscillator {
        Oscillator::new(self.waveform, Arc::clone(&self.table), self.sample_rate)
            .with_phase(index as f32 * 0.618_034)
    }
}
