//! Shared state types for UI communication
//!
//! Everything the audio thread sends is `Copy` so pushing a snapshot never
//! allocates.

use voicebank::{AllocationStrategy, BasicEngine, VoiceMode, MAX_VOICES};

/// One voice as the meters see it.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceView {
    pub active: bool,
    pub gate: bool,
    pub note: u8,
    pub velocity: f32,
    pub pitch_hz: f32,
    pub level: f32,
}

/// Engine state captured at the end of an audio callback.
#[derive(Clone, Copy, Debug)]
pub struct EngineSnapshot {
    pub mode: VoiceMode,
    pub strategy: AllocationStrategy,
    pub portamento_ms: f32,
    pub unison_detune: f32,
    pub voices: [VoiceView; MAX_VOICES],
    pub num_voices: usize,
    pub mixed_voices: usize,
}

impl EngineSnapshot {
    pub fn capture(engine: &BasicEngine) -> Self {
        let mut voices = [VoiceView::default(); MAX_VOICES];
        for (i, view) in voices.iter_mut().enumerate().take(engine.max_voices()) {
            if let Some(info) = engine.voice(i) {
                *view = VoiceView {
                    active: info.slot.active,
                    gate: info.slot.gate,
                    note: info.slot.note,
                    velocity: info.slot.velocity,
                    pitch_hz: info.pitch_hz,
                    level: info.envelope_level,
                };
            }
        }

        Self {
            mode: engine.mode(),
            strategy: engine.allocation_strategy(),
            portamento_ms: engine.portamento_time(),
            unison_detune: engine.unison_detune(),
            voices,
            num_voices: engine.max_voices(),
            mixed_voices: engine.last_block_voices(),
        }
    }

    pub fn voices(&self) -> &[VoiceView] {
        &self.voices[..self.num_voices]
    }
}
