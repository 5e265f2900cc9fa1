// Purpose: turning allocator decisions into sound
// This layer sits above the dsp primitives and below the unit's I/O

pub mod engine;
pub mod factory;
pub mod generator;
pub mod message;
pub mod render;
pub mod trigger;
pub mod voice;

pub use engine::{VoiceEngine, VoiceInfo};
pub use factory::{BasicVoiceFactory, VoiceFactory};
pub use message::{MessageReceiver, SynthMessage};
pub use trigger::{Transition, TriggerController};
