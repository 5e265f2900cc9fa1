#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::engine::{AllocationStrategy, VoiceMode};

/// Control traffic from the UI/MIDI thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    AllNotesOff,
    SetMode(VoiceMode),
    SetStrategy(AllocationStrategy),
    SetPortamento { ms: f32 },
    SetUnisonDetune { cents: f32 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Replays a fixed list of messages. Handy for offline rendering.
impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
