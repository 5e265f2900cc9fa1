use crate::MAX_VOICES;

/// Bookkeeping for one voice of the pool. Pure data.
///
/// `gate` is the key-down signal; `active` stays set after the gate closes
/// until the render path reports the voice's envelope has finished.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceSlot {
    pub active: bool,
    pub gate: bool,
    pub note: u8,
    /// Normalised velocity, 0.0..=1.0.
    pub velocity: f32,
    /// Value of the allocator's note-on counter when this slot was last triggered.
    pub note_on_time: u64,
}

impl VoiceSlot {
    /// Gate closed but the envelope is still ringing out.
    pub fn is_releasing(&self) -> bool {
        self.active && !self.gate
    }

    pub fn is_playing(&self, note: u8) -> bool {
        self.gate && self.note == note
    }
}

/// Fixed-size set of voice indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceMask(u16);

const _: () = assert!(MAX_VOICES <= u16::BITS as usize);

impl VoiceMask {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, index: usize) {
        if index < MAX_VOICES {
            self.0 |= 1 << index;
        }
    }

    pub fn contains(self, index: usize) -> bool {
        index < MAX_VOICES && self.0 & (1 << index) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_VOICES).filter(move |&i| self.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_ignores_out_of_range() {
        let mut mask = VoiceMask::EMPTY;
        mask.insert(3);
        mask.insert(MAX_VOICES);

        assert_eq!(mask.len(), 1);
        assert!(mask.contains(3));
        assert!(!mask.contains(MAX_VOICES));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn releasing_means_active_without_gate() {
        let slot = VoiceSlot {
            active: true,
            gate: false,
            note: 60,
            velocity: 0.5,
            note_on_time: 1,
        };
        assert!(slot.is_releasing());
        assert!(!slot.is_playing(60));
    }
}
