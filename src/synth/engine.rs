use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::dsp::unison::UnisonStack;
use crate::engine::{AllocationStrategy, AllocatorCore, NoteOffResult, VoiceMode, VoiceSlot};
use crate::synth::factory::VoiceFactory;
use crate::synth::generator::{EnvelopeGenerator, PitchedGenerator};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::render::RenderDispatcher;
use crate::synth::trigger::{Transition, TriggerController};
use crate::synth::voice::Voice;
use crate::MAX_BLOCK_SIZE;

/// Point-in-time view of one voice, for meters and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    pub slot: VoiceSlot,
    pub pitch_hz: f32,
    pub envelope_level: f32,
    pub envelope_active: bool,
}

/// A complete synth unit: allocator, trigger controller, voice pool and
/// unison stack behind one real-time-safe interface.
///
/// Everything is allocated in [`VoiceEngine::new`]. After that, note handling
/// and [`VoiceEngine::render`] neither allocate nor lock.
pub struct VoiceEngine<G, E> {
    allocator: AllocatorCore,
    trigger: TriggerController,
    dispatcher: RenderDispatcher,
    voices: Vec<Voice<G, E>>,
    unison: UnisonStack<G>,
}

impl<G: PitchedGenerator, E: EnvelopeGenerator> VoiceEngine<G, E> {
    pub fn new<F>(config: &EngineConfig, factory: &F) -> Result<Self, ConfigError>
    where
        F: VoiceFactory<Oscillator = G, Envelope = E>,
    {
        config.validate()?;

        let mut allocator = AllocatorCore::new(config.max_voices);
        allocator.set_mode(config.mode);
        allocator.set_allocation_strategy(config.strategy);

        let mut trigger = TriggerController::new(config.sample_rate);
        trigger.set_portamento_time(config.portamento_ms);
        trigger.set_reference_pitch(config.reference_hz);

        let voices = (0..allocator.max_voices())
            .map(|_| {
                let (oscillator, envelope) = factory.create_voice();
                Voice::new(oscillator, envelope)
            })
            .collect();

        let unison = UnisonStack::new(
            config.unison.voices,
            config.unison.detune_cents,
            config.unison.spread,
            |i| factory.create_unison_oscillator(i),
        );

        debug!(
            sample_rate = config.sample_rate,
            max_voices = allocator.max_voices(),
            mode = ?config.mode,
            strategy = ?config.strategy,
            unison_voices = unison.len(),
            "voice engine ready"
        );

        Ok(Self {
            allocator,
            trigger,
            dispatcher: RenderDispatcher::new(),
            voices,
            unison,
        })
    }

    /// Returns how the chosen voice was moved onto the note.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> Option<Transition> {
        let result = self.allocator.note_on(note, velocity);
        let index = result.voice_index?;
        let slot = *self.allocator.voice(index)?;
        let voice = self.voices.get_mut(index)?;

        let transition = self
            .trigger
            .trigger_voice(voice, slot.note, slot.velocity, result.allow_legato);
        self.dispatcher.activate(index);
        Some(transition)
    }

    pub fn note_off(&mut self, note: u8) -> NoteOffResult {
        let result = self.allocator.note_off(note);

        for index in result.released.iter() {
            if let Some(voice) = self.voices.get_mut(index) {
                voice.release();
            }
        }

        if let (true, Some(next)) = (result.retrigger, result.retrigger_note) {
            // Fall back to the previous key: legato into it, keeping the current level.
            let velocity = self.allocator.voice(0).map_or(0.0, |slot| slot.velocity);
            if let Some(voice) = self.voices.first_mut() {
                self.trigger.trigger_voice(voice, next, velocity, true);
            }
        }

        result
    }

    /// Release every sounding voice. Tails ring out; nothing is cut.
    pub fn all_notes_off(&mut self) {
        let released = self.allocator.all_notes_off();
        for index in released.iter() {
            if let Some(voice) = self.voices.get_mut(index) {
                voice.release();
            }
        }
    }

    /// Takes effect on the next note. Voices already sounding are left alone.
    pub fn set_mode(&mut self, mode: VoiceMode) {
        self.allocator.set_mode(mode);
    }

    pub fn set_allocation_strategy(&mut self, strategy: AllocationStrategy) {
        self.allocator.set_allocation_strategy(strategy);
    }

    pub fn set_portamento_time(&mut self, ms: f32) {
        self.trigger.set_portamento_time(ms);
    }

    pub fn set_unison_detune(&mut self, cents: f32) {
        self.unison.set_detune(cents);
    }

    pub fn set_unison_spread(&mut self, spread: f32) {
        self.unison.set_spread(spread);
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => {
                self.note_on(note, velocity);
            }
            SynthMessage::NoteOff { note, .. } => {
                self.note_off(note);
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::SetMode(mode) => self.set_mode(mode),
            SynthMessage::SetStrategy(strategy) => self.set_allocation_strategy(strategy),
            SynthMessage::SetPortamento { ms } => self.set_portamento_time(ms),
            SynthMessage::SetUnisonDetune { cents } => self.set_unison_detune(cents),
        }
    }

    /// Drain every pending control message.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
    }

    /// Fill both channels. Any length is accepted; work is done in
    /// `MAX_BLOCK_SIZE` chunks.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let mode = self.allocator.mode();

        for (l, r) in left[..frames]
            .chunks_mut(MAX_BLOCK_SIZE)
            .zip(right[..frames].chunks_mut(MAX_BLOCK_SIZE))
        {
            self.dispatcher.render(
                mode,
                &mut self.allocator,
                &mut self.voices,
                &mut self.unison,
                l,
                r,
            );
        }
    }

    /// Silence everything and forget all notes. Configuration is kept.
    pub fn reset(&mut self) {
        self.allocator.reset();
        self.dispatcher.reset();
        for voice in &mut self.voices {
            voice.silence();
        }
    }

    pub fn voice(&self, index: usize) -> Option<VoiceInfo> {
        let slot = *self.allocator.voice(index)?;
        let voice = self.voices.get(index)?;

        Some(VoiceInfo {
            slot,
            pitch_hz: voice.pitch_hz(),
            envelope_level: voice.envelope_level(),
            envelope_active: voice.envelope_active(),
        })
    }

    pub fn mode(&self) -> VoiceMode {
        self.allocator.mode()
    }

    pub fn allocation_strategy(&self) -> AllocationStrategy {
        self.allocator.allocation_strategy()
    }

    pub fn portamento_time(&self) -> f32 {
        self.trigger.portamento_time()
    }

    pub fn unison_detune(&self) -> f32 {
        self.unison.detune_cents()
    }

    pub fn max_voices(&self) -> usize {
        self.allocator.max_voices()
    }

    pub fn active_voice_count(&self) -> usize {
        self.allocator.active_voice_count()
    }

    /// Voices mixed into the last rendered block.
    pub fn last_block_voices(&self) -> usize {
        self.dispatcher.contributors()
    }

    pub fn held_notes(&self) -> &[u8] {
        self.allocator.held_notes().as_slice()
    }
}
