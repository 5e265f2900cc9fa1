pub mod config; // Engine configuration and validation
pub mod dsp;
pub mod engine; // Pure voice-allocation decisions
pub mod io;
pub mod synth; // Triggering, rendering and the unit facade

pub use config::{ConfigError, EngineConfig};
pub use engine::{AllocationStrategy, VoiceMode};
pub use synth::{BasicVoiceFactory, SynthMessage, VoiceEngine, VoiceFactory};

/// Engine built from the bundled oscillator and ADSR.
pub type BasicEngine = VoiceEngine<dsp::oscillator::Oscillator, dsp::envelope::Envelope>;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Upper bound on the voice pool of any unit.
pub const MAX_VOICES: usize = 16;

impl BasicEngine {
    /// Build an engine with the bundled generators described by `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        VoiceEngine::new(config, &BasicVoiceFactory::from_config(config))
    }
}
