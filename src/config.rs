#[cfg(feature = "serde")]
use std::path::Path;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(feature = "serde")]
use tracing::debug;

use crate::dsp::oscillator::OscillatorWaveform;
use crate::dsp::unison::{MAX_UNISON_VOICES, MIN_UNISON_VOICES};
use crate::engine::{AllocationStrategy, VoiceMode};
use crate::synth::trigger::{DEFAULT_REFERENCE_HZ, MAX_PORTAMENTO_MS};
use crate::MAX_VOICES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "serde")]
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Amplitude envelope times in seconds, sustain as a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnisonConfig {
    /// Odd, 3..=7.
    pub voices: usize,
    pub detune_cents: f32,
    /// Stereo width, 0.0 (mono) to 1.0.
    pub spread: f32,
}

impl Default for UnisonConfig {
    fn default() -> Self {
        Self {
            voices: 5,
            detune_cents: 10.0,
            spread: 0.7,
        }
    }
}

/// Everything needed to build a [`VoiceEngine`](crate::VoiceEngine).
///
/// ```toml
/// sample_rate = 48000.0
/// max_voices = 7
/// mode = "polyphonic"
/// strategy = "oldest_note"
/// portamento_ms = 80.0
///
/// [unison]
/// voices = 5
/// detune_cents = 12.0
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
    pub mode: VoiceMode,
    pub strategy: AllocationStrategy,
    pub portamento_ms: f32,
    pub reference_hz: f32,
    pub waveform: OscillatorWaveform,
    pub unison: UnisonConfig,
    pub envelope: AdsrConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 4,
            mode: VoiceMode::Polyphonic,
            strategy: AllocationStrategy::RoundRobin,
            portamento_ms: 0.0,
            reference_hz: DEFAULT_REFERENCE_HZ,
            waveform: OscillatorWaveform::default(),
            unison: UnisonConfig::default(),
            envelope: AdsrConfig::default(),
        }
    }
}

impl EngineConfig {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Reject values the engine would otherwise have to clamp silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(invalid("sample_rate", format!("{} is not a positive rate", self.sample_rate)));
        }
        if !(1..=MAX_VOICES).contains(&self.max_voices) {
            return Err(invalid(
                "max_voices",
                format!("{} is outside 1..={MAX_VOICES}", self.max_voices),
            ));
        }
        if !(0.0..=MAX_PORTAMENTO_MS).contains(&self.portamento_ms) {
            return Err(invalid(
                "portamento_ms",
                format!("{} is outside 0..={MAX_PORTAMENTO_MS}", self.portamento_ms),
            ));
        }
        if !(self.reference_hz.is_finite() && self.reference_hz > 0.0) {
            return Err(invalid("reference_hz", format!("{} is not a positive pitch", self.reference_hz)));
        }

        let unison = &self.unison;
        if !(MIN_UNISON_VOICES..=MAX_UNISON_VOICES).contains(&unison.voices) || unison.voices % 2 == 0 {
            return Err(invalid(
                "unison.voices",
                format!("{} must be odd and within {MIN_UNISON_VOICES}..={MAX_UNISON_VOICES}", unison.voices),
            ));
        }
        if !(0.0..=100.0).contains(&unison.detune_cents) {
            return Err(invalid("unison.detune_cents", format!("{} is outside 0..=100", unison.detune_cents)));
        }
        if !(0.0..=1.0).contains(&unison.spread) {
            return Err(invalid("unison.spread", format!("{} is outside 0..=1", unison.spread)));
        }

        let env = &self.envelope;
        for (field, seconds) in [
            ("envelope.attack", env.attack),
            ("envelope.decay", env.decay),
            ("envelope.release", env.release),
        ] {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(invalid(field, format!("{seconds} is not a time in seconds")));
            }
        }
        if !(0.0..=1.0).contains(&env.sustain) {
            return Err(invalid("envelope.sustain", format!("{} is outside 0..=1", env.sustain)));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
