//! Pure voice-allocation decisions.
//!
//! Nothing in this module touches audio. [`AllocatorCore`] takes note events
//! and answers "which voice, and how": it owns the fixed voice pool
//! bookkeeping and the held-note stack, and leaves pitch, envelopes and
//! rendering to [`crate::synth`].

pub mod allocator;
pub mod held_notes;
pub mod slot;
pub mod strategy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use allocator::{AllocatorCore, NoteOffResult, NoteOnResult};
pub use held_notes::{HeldNoteStack, MAX_HELD_NOTES};
pub use slot::{VoiceMask, VoiceSlot};
pub use strategy::AllocationStrategy;

/// How note events map onto the voice pool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    /// One voice, last-note priority, legato glides.
    Monophonic,
    /// Independent voices, stealing when the pool is full.
    #[default]
    Polyphonic,
    /// Monophonic note handling driving a detuned oscillator stack.
    Unison,
}

impl VoiceMode {
    /// True for the modes that multiplex voice 0 over the held-note stack.
    pub fn is_single_voice(self) -> bool {
        matches!(self, VoiceMode::Monophonic | VoiceMode::Unison)
    }
}

impl TryFrom<u8> for VoiceMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoiceMode::Monophonic),
            1 => Ok(VoiceMode::Polyphonic),
            2 => Ok(VoiceMode::Unison),
            other => Err(other),
        }
    }
}
