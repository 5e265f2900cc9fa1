/// Capacity of the held-note stack.
pub const MAX_HELD_NOTES: usize = 16;

/// Physically held notes, oldest first.
///
/// Backs last-note priority in the single-voice modes: when the sounding key
/// lifts, the voice falls back to the most recent note still held. A note
/// appears at most once; pressing a held note again makes it the most recent.
/// Pushing a 17th distinct note is dropped silently.
#[derive(Debug, Clone, Copy)]
pub struct HeldNoteStack {
    notes: [u8; MAX_HELD_NOTES],
    len: usize,
}

impl HeldNoteStack {
    pub const fn new() -> Self {
        Self {
            notes: [0; MAX_HELD_NOTES],
            len: 0,
        }
    }

    /// Record `note` as the most recently pressed key.
    ///
    /// Returns false when the stack was full and the note is not tracked.
    pub fn push(&mut self, note: u8) -> bool {
        if let Some(pos) = self.position(note) {
            self.notes.copy_within(pos + 1..self.len, pos);
            self.notes[self.len - 1] = note;
            return true;
        }

        if self.len == MAX_HELD_NOTES {
            return false;
        }

        self.notes[self.len] = note;
        self.len += 1;
        true
    }

    /// Remove `note`, keeping the order of the rest. Returns whether it was held.
    pub fn remove(&mut self, note: u8) -> bool {
        match self.position(note) {
            Some(pos) => {
                self.notes.copy_within(pos + 1..self.len, pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Most recently pressed note still held.
    pub fn last(&self) -> Option<u8> {
        self.as_slice().last().copied()
    }

    pub fn contains(&self, note: u8) -> bool {
        self.position(note).is_some()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Held notes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.notes[..self.len]
    }

    fn position(&self, note: u8) -> Option<usize> {
        self.as_slice().iter().position(|&n| n == note)
    }
}

impl Default for HeldNoteStack {
    fn default() -> Self {
        Self::new()
    }
}
