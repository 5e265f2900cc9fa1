use crate::engine::{AllocationStrategy, VoiceMode};
use crate::io::midi::MidiEvent;
use crate::synth::message::SynthMessage;

/// Portamento time, scaled onto 0..=PORTAMENTO_CC_RANGE_MS.
pub const CC_PORTAMENTO_TIME: u8 = 5;
/// Voice mode by index: 0 mono, 1 poly, 2 unison.
pub const CC_VOICE_MODE: u8 = 102;
/// Allocation strategy by index, see `AllocationStrategy::try_from`.
pub const CC_ALLOCATION_STRATEGY: u8 = 103;
pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

const PORTAMENTO_CC_RANGE_MS: f32 = 2_000.0;

/// Translate a MIDI event on `channel_filter` into an engine message.
///
/// Note-on with velocity 0 is a note-off. Controllers carrying an index the
/// engine does not know are dropped rather than mapped to a fallback.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange {
            controller, value, ..
        } => match controller {
            CC_ALL_SOUND_OFF | CC_ALL_NOTES_OFF => Some(SynthMessage::AllNotesOff),
            CC_PORTAMENTO_TIME => Some(SynthMessage::SetPortamento {
                ms: normalize_velocity(value) * PORTAMENTO_CC_RANGE_MS,
            }),
            CC_VOICE_MODE => VoiceMode::try_from(value).ok().map(SynthMessage::SetMode),
            CC_ALLOCATION_STRATEGY => AllocationStrategy::try_from(value)
                .ok()
                .map(SynthMessage::SetStrategy),
            _ => None,
        },
    }
}

/// Equal-tempered frequency of `note`, with A4 (note 69) at `reference_hz`.
#[inline]
pub fn note_to_freq(note: u8, reference_hz: f32) -> f32 {
    reference_hz * 2.0_f32.powf((f32::from(note) - 69.0) / 12.0)
}

/// MIDI 0..=127 to 0.0..=1.0.
#[inline]
pub fn normalize_velocity(velocity: u8) -> f32 {
    f32::from(velocity.min(127)) / 127.0
}
