use tracing::debug;

use crate::engine::held_notes::HeldNoteStack;
use crate::engine::slot::{VoiceMask, VoiceSlot};
use crate::engine::strategy::AllocationStrategy;
use crate::engine::VoiceMode;
use crate::MAX_VOICES;

/*
Allocator State Machine
=======================

Per voice (Polyphonic) or once, multiplexed over the held-note stack
(Monophonic / Unison):

    Idle --NoteOn--> Sounding --NoteOff, notes still held--> Sounding(new target)
                        |
                        +--NoteOff, nothing held--> Releasing --envelope done--> Idle

The allocator only moves the bookkeeping: `gate` follows the keys, `active`
is set on NoteOn and cleared when the render path calls `set_voice_active`.
Which samples come out of a voice is the trigger controller's business.

Mode switches are deliberately shallow. Voices sounding under the old mode are
neither moved nor silenced; their gates still close when their keys lift,
because NoteOff always releases every gated slot bound to that note.
*/

/// Outcome of a note-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteOnResult {
    /// Voice that now plays the note. `None` only if the pool is unusable.
    pub voice_index: Option<usize>,
    /// The voice was already sounding; the caller may glide instead of retriggering.
    pub allow_legato: bool,
    /// The voice was taken from another note.
    pub stolen: bool,
}

/// Outcome of a note-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteOffResult {
    /// Single-voice modes: the sounding key lifted while others are held.
    pub retrigger: bool,
    /// The note voice 0 should move to when `retrigger` is set.
    pub retrigger_note: Option<u8>,
    /// Keys are still down (held stack in single-voice modes, any gate in Polyphonic).
    pub has_held_notes: bool,
    /// Voices whose gate closed on this call. Their envelopes must be released.
    pub released: VoiceMask,
}

/// Mode-aware voice assignment over a fixed pool.
#[derive(Debug, Clone)]
pub struct AllocatorCore {
    voices: [VoiceSlot; MAX_VOICES],
    max_voices: usize,
    round_robin_index: usize,
    timestamp: u64,

    mode: VoiceMode,
    strategy: AllocationStrategy,

    held: HeldNoteStack,
}

impl AllocatorCore {
    /// Fix the pool size for the lifetime of the allocator, clamped to `1..=MAX_VOICES`.
    pub fn new(max_voices: usize) -> Self {
        let max_voices = max_voices.clamp(1, MAX_VOICES);
        debug!(max_voices, "voice allocator initialised");

        Self {
            voices: [VoiceSlot::default(); MAX_VOICES],
            max_voices,
            round_robin_index: 0,
            timestamp: 0,
            mode: VoiceMode::default(),
            strategy: AllocationStrategy::default(),
            held: HeldNoteStack::new(),
        }
    }

    /// Forget every note and voice, keeping pool size, mode and strategy.
    pub fn reset(&mut self) {
        self.voices = [VoiceSlot::default(); MAX_VOICES];
        self.round_robin_index = 0;
        self.timestamp = 0;
        self.held.clear();
    }

    pub fn set_mode(&mut self, mode: VoiceMode) {
        if mode != self.mode {
            debug!(from = ?self.mode, to = ?mode, "voice mode changed");
        }
        self.mode = mode;
    }

    pub fn set_allocation_strategy(&mut self, strategy: AllocationStrategy) {
        if strategy != self.strategy {
            debug!(?strategy, "allocation strategy changed");
        }
        self.strategy = strategy;
    }

    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    pub fn allocation_strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> NoteOnResult {
        self.timestamp += 1;
        let note = note.min(127);

        let (index, allow_legato, stolen) = if self.mode.is_single_voice() {
            self.held.push(note);
            (0, self.voices[0].active, false)
        } else {
            let (index, stolen) = self.allocate_index();
            (index, false, stolen)
        };

        let timestamp = self.timestamp;
        let slot = &mut self.voices[index];
        slot.active = true;
        slot.gate = true;
        slot.note = note;
        slot.velocity = f32::from(velocity.min(127)) / 127.0;
        slot.note_on_time = timestamp;

        NoteOnResult {
            voice_index: Some(index),
            allow_legato,
            stolen,
        }
    }

    pub fn note_off(&mut self, note: u8) -> NoteOffResult {
        let mut result = NoteOffResult::default();
        let was_held = self.held.remove(note);

        if self.mode.is_single_voice() {
            let voice = &mut self.voices[0];
            let sounding = voice.is_playing(note);

            if sounding {
                match self.held.last() {
                    Some(next) => {
                        voice.note = next;
                        result.retrigger = true;
                        result.retrigger_note = Some(next);
                    }
                    None => {
                        voice.gate = false;
                        result.released.insert(0);
                    }
                }
            } else if was_held && self.held.is_empty() && voice.gate {
                // Last key up while voice 0 tracks a note that overflowed the stack.
                voice.gate = false;
                result.released.insert(0);
            }
        }

        // Polyphonic voices, and voices left over from a previous mode.
        for (i, slot) in self.voices[..self.max_voices].iter_mut().enumerate() {
            if result.released.contains(i) || (i == 0 && self.mode.is_single_voice()) {
                continue;
            }
            if slot.is_playing(note) {
                slot.gate = false;
                result.released.insert(i);
            }
        }

        result.has_held_notes = if self.mode.is_single_voice() {
            !self.held.is_empty()
        } else {
            self.pool().iter().any(|slot| slot.active)
        };

        result
    }

    /// Clear the held stack and close every gate. Returns the voices to release.
    pub fn all_notes_off(&mut self) -> VoiceMask {
        self.held.clear();

        let mut released = VoiceMask::EMPTY;
        for (i, slot) in self.voices[..self.max_voices].iter_mut().enumerate() {
            if slot.gate {
                slot.gate = false;
                released.insert(i);
            }
        }
        released
    }

    /// Report envelope completion (or revival) from the render path.
    pub fn set_voice_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.voices[..self.max_voices].get_mut(index) {
            slot.active = active;
            if !active {
                slot.gate = false;
            }
        }
    }

    pub fn has_held_notes(&self) -> bool {
        !self.held.is_empty()
    }

    pub fn held_notes(&self) -> &HeldNoteStack {
        &self.held
    }

    pub fn voice(&self, index: usize) -> Option<&VoiceSlot> {
        self.pool().get(index)
    }

    /// The usable part of the pool.
    pub fn pool(&self) -> &[VoiceSlot] {
        &self.voices[..self.max_voices]
    }

    pub fn active_voice_count(&self) -> usize {
        self.pool().iter().filter(|slot| slot.active).count()
    }

    fn allocate_index(&mut self) -> (usize, bool) {
        if let Some(free) = self.pool().iter().position(|slot| !slot.active) {
            return (free, false);
        }

        let index = self
            .strategy
            .steal(&self.voices[..self.max_voices], &mut self.round_robin_index);
        (index.min(self.max_voices - 1), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(voices: usize, strategy: AllocationStrategy) -> AllocatorCore {
        let mut core = AllocatorCore::new(voices);
        core.set_mode(VoiceMode::Polyphonic);
        core.set_allocation_strategy(strategy);
        core
    }

    fn mono() -> AllocatorCore {
        let mut core = AllocatorCore::new(4);
        core.set_mode(VoiceMode::Monophonic);
        core
    }

    #[test]
    fn pool_size_is_clamped() {
        assert_eq!(AllocatorCore::new(0).max_voices(), 1);
        assert_eq!(AllocatorCore::new(7).max_voices(), 7);
        assert_eq!(AllocatorCore::new(64).max_voices(), MAX_VOICES);
    }

    #[test]
    fn last_note_priority() {
        let mut core = mono();
        core.note_on(60, 100);
        core.note_on(64, 100);

        let off = core.note_off(64);

        assert!(off.retrigger);
        assert_eq!(off.retrigger_note, Some(60));
        assert!(off.has_held_notes);
        assert!(off.released.is_empty());
        assert_eq!(core.voice(0).map(|v| v.note), Some(60));
    }

    #[test]
    fn releasing_a_background_note_does_not_retrigger() {
        let mut core = mono();
        core.note_on(60, 100);
        core.note_on(64, 100);

        let off = core.note_off(60);

        assert!(!off.retrigger);
        assert!(off.has_held_notes);
        assert!(off.released.is_empty());
        assert_eq!(core.voice(0).map(|v| v.note), Some(64));
    }

    #[test]
    fn full_release() {
        let mut core = mono();
        core.note_on(60, 100);

        let off = core.note_off(60);

        assert!(!off.retrigger);
        assert!(!off.has_held_notes);
        assert!(!core.has_held_notes());
        assert!(off.released.contains(0));
        assert!(core.voice(0).is_some_and(|v| v.active && !v.gate));
    }

    #[test]
    fn mono_legato_requires_sounding_voice() {
        let mut core = mono();

        let first = core.note_on(60, 100);
        assert_eq!(first.voice_index, Some(0));
        assert!(!first.allow_legato);

        let second = core.note_on(62, 100);
        assert_eq!(second.voice_index, Some(0));
        assert!(second.allow_legato);
    }

    #[test]
    fn unison_always_uses_voice_zero() {
        let mut core = AllocatorCore::new(4);
        core.set_mode(VoiceMode::Unison);

        for note in [48, 52, 55] {
            assert_eq!(core.note_on(note, 90).voice_index, Some(0));
        }
        assert_eq!(core.active_voice_count(), 1);
        assert_eq!(core.held_notes().as_slice(), &[48, 52, 55]);
    }

    #[test]
    fn idempotent_held_notes() {
        let mut core = mono();
        core.note_on(60, 100);
        core.note_on(60, 100);

        assert_eq!(core.held_notes().as_slice(), &[60]);
    }

    #[test]
    fn polyphonic_fills_free_slots_first() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);

        let indices: Vec<_> = [60, 62, 64, 65]
            .iter()
            .map(|&n| core.note_on(n, 100))
            .collect();

        assert_eq!(
            indices.iter().map(|r| r.voice_index).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
        assert!(indices.iter().all(|r| !r.allow_legato && !r.stolen));
    }

    #[test]
    fn round_robin_determinism() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        for note in [60, 62, 64, 65] {
            core.note_on(note, 100);
        }

        let steal = core.note_on(67, 100);

        assert_eq!(steal.voice_index, Some(1));
        assert!(steal.stolen);
        assert_eq!(core.voice(1).map(|v| v.note), Some(67));
    }

    #[test]
    fn oldest_note_stealing() {
        let mut core = poly(4, AllocationStrategy::OldestNote);
        for note in [60, 62, 64, 65] {
            core.note_on(note, 100);
        }
        // Re-stamp so timestamps read {5, 9, 2, 7}.
        for (i, t) in [5u64, 9, 2, 7].into_iter().enumerate() {
            core.voices[i].note_on_time = t;
        }
        core.timestamp = 9;

        let steal = core.note_on(72, 100);

        assert_eq!(steal.voice_index, Some(2));
        assert_eq!(core.voice(2).map(|v| v.note_on_time), Some(10));
    }

    #[test]
    fn first_available_steals_zero() {
        let mut core = poly(4, AllocationStrategy::FirstAvailable);
        for note in [60, 62, 64, 65, 67] {
            core.note_on(note, 100);
        }
        assert_eq!(core.voice(0).map(|v| v.note), Some(67));
    }

    #[test]
    fn poly_note_off_releases_every_instance() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        core.note_on(60, 100);
        core.note_off(60);
        core.note_on(60, 100); // previous instance still releasing
        core.note_on(64, 100);

        let off = core.note_off(60);

        assert_eq!(off.released.iter().collect::<Vec<_>>(), vec![1]);
        assert!(off.has_held_notes);
    }

    #[test]
    fn poly_release_tails_count_as_held() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        core.note_on(60, 100);

        let off = core.note_off(60);
        assert_eq!(core.active_voice_count(), 1);
        assert!(off.has_held_notes);

        core.set_voice_active(0, false);
        assert!(!core.note_off(60).has_held_notes);
    }

    #[test]
    fn unknown_note_off_is_a_no_op() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        core.note_on(60, 100);

        let off = core.note_off(61);

        assert_eq!(off, NoteOffResult {
            has_held_notes: true,
            ..NoteOffResult::default()
        });

        let mut core = mono();
        core.note_on(60, 100);
        let off = core.note_off(61);
        assert!(off.released.is_empty());
        assert!(!off.retrigger);
        assert!(core.voice(0).is_some_and(|v| v.gate));
    }

    #[test]
    fn pool_bound_holds_under_churn() {
        let mut core = poly(4, AllocationStrategy::OldestNote);
        for step in 0..500u32 {
            let note = (step * 7 % 40 + 40) as u8;
            if step % 3 == 2 {
                core.note_off(note);
            } else {
                core.note_on(note, 80);
            }
            if step % 11 == 0 {
                core.set_voice_active((step % 4) as usize, false);
            }
            assert!(core.active_voice_count() <= core.max_voices());
        }
    }

    #[test]
    fn all_notes_off_closes_gates_without_freeing() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        for note in [60, 64, 67] {
            core.note_on(note, 100);
        }

        let released = core.all_notes_off();

        assert_eq!(released.len(), 3);
        assert!(!core.has_held_notes());
        assert_eq!(core.active_voice_count(), 3);
        assert!(core.pool().iter().all(|v| !v.gate));
    }

    #[test]
    fn set_voice_active_ignores_out_of_range() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        core.note_on(60, 100);

        core.set_voice_active(9, false);
        assert_eq!(core.active_voice_count(), 1);

        core.set_voice_active(0, false);
        assert_eq!(core.active_voice_count(), 0);
        assert!(core.voice(0).is_some_and(|v| !v.gate));
    }

    #[test]
    fn mode_switch_leaves_voices_alone_but_releases_their_keys() {
        let mut core = poly(4, AllocationStrategy::RoundRobin);
        core.note_on(60, 100);
        core.note_on(64, 100);
        core.note_on(67, 100);

        core.set_mode(VoiceMode::Monophonic);
        assert_eq!(core.active_voice_count(), 3);

        let off = core.note_off(64);
        assert!(off.released.contains(1));
        assert!(core.voice(1).is_some_and(|v| v.is_releasing()));
    }

    #[test]
    fn velocity_is_normalised() {
        let mut core = poly(2, AllocationStrategy::RoundRobin);
        core.note_on(60, 127);
        core.note_on(61, 0);

        assert_eq!(core.voice(0).map(|v| v.velocity), Some(1.0));
        assert_eq!(core.voice(1).map(|v| v.velocity), Some(0.0));
    }
}
