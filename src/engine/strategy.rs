#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::slot::VoiceSlot;

/*
Voice Stealing
==============

Only consulted in Polyphonic mode, and only when every slot is active. A
steal never fails: every strategy returns some index in 0..max_voices. The
choice of victim is a musical trade-off, not an error path.

  RoundRobin      A rotating cursor, advanced BEFORE use. Deterministic and
                  starvation-free; ignores how long notes have been sounding.
                  With four voices the first steal takes index 1.

  OldestNote      The slot with the smallest note_on_time. Sacrifices the
                  longest-sounding note for the newest one.

  FirstAvailable  Always index 0. Cheapest possible steal; under sustained
                  chords voice 0 is churned over and over.

  ReleaseFirst    Prefer voices whose key is already up (oldest first), and
                  only then the oldest held voice. Keeps attacks and held
                  chord tones intact at the price of cutting release tails.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationStrategy {
    #[default]
    RoundRobin,
    OldestNote,
    FirstAvailable,
    ReleaseFirst,
}

impl AllocationStrategy {
    /// Pick the slot to sacrifice. `cursor` is the round-robin state owned by the allocator.
    pub fn steal(self, slots: &[VoiceSlot], cursor: &mut usize) -> usize {
        if slots.is_empty() {
            return 0;
        }

        match self {
            AllocationStrategy::RoundRobin => {
                *cursor = (*cursor + 1) % slots.len();
                *cursor
            }
            AllocationStrategy::OldestNote => oldest(slots, |s| s.active).unwrap_or(0),
            AllocationStrategy::FirstAvailable => 0,
            AllocationStrategy::ReleaseFirst => oldest(slots, VoiceSlot::is_releasing)
                .or_else(|| oldest(slots, |s| s.gate))
                .unwrap_or(0),
        }
    }
}

impl TryFrom<u8> for AllocationStrategy {
    type Error = u8;

    /// Map a unit parameter index onto a strategy.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AllocationStrategy::RoundRobin),
            1 => Ok(AllocationStrategy::OldestNote),
            2 => Ok(AllocationStrategy::FirstAvailable),
            3 => Ok(AllocationStrategy::ReleaseFirst),
            other => Err(other),
        }
    }
}

/// Lowest `note_on_time` among slots matching `filter`; ties go to the lower index.
fn oldest(slots: &[VoiceSlot], filter: impl Fn(&VoiceSlot) -> bool) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| filter(*slot))
        .min_by_key(|(_, slot)| slot.note_on_time)
        .map(|(idx, _)| idx)
}
