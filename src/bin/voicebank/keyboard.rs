//! Computer-keyboard piano.
//!
//! Terminals only report key presses, so notes latch: the first press of a
//! key sends note-on, the second sends note-off. That is enough to hold a
//! chord, or several notes in mono mode and walk back through them.

use voicebank::SynthMessage;

/// Two rows of a piano, starting at C.
const LAYOUT: &str = "awsedftgyhujkolp;";

pub const MIN_OCTAVE: i8 = 1;
pub const MAX_OCTAVE: i8 = 7;

pub struct Keyboard {
    octave: i8,
    latched: [bool; 128],
    velocity: u8,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            latched: [false; 128],
            velocity: 100,
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shift_octave(&mut self, delta: i8) {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
    }

    /// Toggle the note under `key`, if it is a piano key.
    pub fn press(&mut self, key: char) -> Option<SynthMessage> {
        let offset = LAYOUT.find(key.to_ascii_lowercase())?;
        let note = (i32::from(self.octave) + 1) * 12 + offset as i32;
        let note = u8::try_from(note).ok().filter(|n| *n < 128)?;

        let latched = &mut self.latched[usize::from(note)];
        *latched = !*latched;
        Some(if *latched {
            SynthMessage::NoteOn {
                note,
                velocity: self.velocity,
            }
        } else {
            SynthMessage::NoteOff { note, velocity: 0 }
        })
    }

    /// Forget every latched note.
    pub fn release_all(&mut self) {
        self.latched = [false; 128];
    }

    pub fn latched_notes(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..128).filter(|&n| self.latched[usize::from(n)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_press_releases() {
        let mut kb = Keyboard::new();

        assert_eq!(
            kb.press('a'),
            Some(SynthMessage::NoteOn {
                note: 60,
                velocity: 100
            })
        );
        assert_eq!(
            kb.press('a'),
            Some(SynthMessage::NoteOff {
                note: 60,
                velocity: 0
            })
        );
        assert_eq!(kb.press('1'), None);
    }

    #[test]
    fn octave_shift_is_bounded() {
        let mut kb = Keyboard::new();
        for _ in 0..10 {
            kb.shift_octave(1);
        }
        assert_eq!(kb.octave(), MAX_OCTAVE);
        assert!(matches!(kb.press('p'), Some(SynthMessage::NoteOn { note: 111, .. })));
    }
}
