
/*
ADSR Envelope
=============

The amplitude envelope is the voice engine's only window into whether a voice
is still audible. The engine never looks at the signal itself: a voice whose
gate is low and whose envelope reports `is_active() == false` is finished and
its slot can be handed to the next note.

Vocabulary
----------

  gate        The key-down signal. `note_on` raises it (enter Attack),
              `note_off` lowers it (enter Release from the current level).

  retrigger   A hard Note-On: the engine calls `reset()` then `note_on()`,
              so the attack always starts from zero.

  legato      The engine simply does not call `note_on` again. The envelope
              keeps running through Attack/Decay/Sustain while the pitch moves.


Stage Machine
-------------

    Idle --note_on--> Attack --level=1--> Decay --level=S--> Sustain
      ^                  |                  |                   |
      |                  +------ note_off --+------ note_off ---+
      |                                     v
      +------------ level=0 ------------ Release

Release always starts from the CURRENT level, not from the sustain level, so
lifting a key during the attack does not jump.


Time to Increment
-----------------

    increment = change / (time_seconds * sample_rate)

Release is pre-computed at note_off as a fixed number of samples and
interpolated linearly, so it lands exactly on zero and the voice frees on a
predictable sample.
*/

/// The current stage of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear ADSR envelope generator.
#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,

    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    decay_start_level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::adsr(sample_rate, 0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        // No stage shorter than one sample.
        let min_time = 1.0 / sample_rate;

        Self {
            sample_rate,
            attack_time: attack.max(min_time),
            decay_time: decay.max(min_time),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(min_time),

            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: start the attack phase from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * self.sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                self.level -= total_drop / (self.decay_time * self.sample_rate);

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Drop straight to idle. Used before a hard retrigger.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
