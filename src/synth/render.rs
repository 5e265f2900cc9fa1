use crate::dsp::mix::{clear_stereo, equal_power_gain, scale_in_place, sum_in_place};
use crate::dsp::unison::UnisonStack;
use crate::engine::{AllocatorCore, VoiceMode};
use crate::synth::generator::{EnvelopeGenerator, PitchedGenerator};
use crate::synth::voice::Voice;
use crate::{MAX_BLOCK_SIZE, MAX_VOICES};

/*
Render Dispatch
===============

Called once per audio block. The mode picks the path:

  Monophonic   voice 0 only. If its gate is low and its envelope is idle the
               block is silence and nothing is computed.

  Unison       voice 0's pitch and envelope drive the detuned stack. Same
               early exit.

  Polyphonic   every voice on the active list renders into a scratch buffer
               and is summed. With more than one contributor the sum is scaled
               by 1/sqrt(count) (see dsp::mix).

After rendering, the active list is pruned. A voice stays while its gate is
high or its envelope is still running; one that drops off is reported back to
the allocator with set_voice_active(idx, false), which makes its slot free
for the next note-on.

In the single-voice modes, leftovers from a previous Polyphonic phase are not
rendered. They are dropped from the list and reported free on the first block.
*/

/// Fixed-capacity ordered set of voice indices that may be sounding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveVoiceList {
    indices: [u8; MAX_VOICES],
    len: usize,
}

impl ActiveVoiceList {
    pub const fn new() -> Self {
        Self {
            indices: [0; MAX_VOICES],
            len: 0,
        }
    }

    /// Append `index` unless it is already listed.
    pub fn push(&mut self, index: usize) {
        if index >= MAX_VOICES || self.contains(index) || self.len == MAX_VOICES {
            return;
        }
        self.indices[self.len] = index as u8;
        self.len += 1;
    }

    pub fn contains(&self, index: usize) -> bool {
        self.iter().any(|i| i == index)
    }

    /// Keep the indices for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut write = 0;
        for read in 0..self.len {
            let index = self.indices[read];
            if keep(index as usize) {
                self.indices[write] = index;
                write += 1;
            }
        }
        self.len = write;
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices[..self.len].iter().map(|&i| i as usize)
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
}

pub struct RenderDispatcher {
    active: ActiveVoiceList,
    scratch: Box<[f32]>,
    contributors: usize,
}

impl RenderDispatcher {
    pub fn new() -> Self {
        Self {
            active: ActiveVoiceList::new(),
            scratch: vec![0.0; MAX_BLOCK_SIZE].into_boxed_slice(),
            contributors: 0,
        }
    }

    /// Mark `index` as triggered.
    pub fn activate(&mut self, index: usize) {
        self.active.push(index);
    }

    pub fn active_voices(&self) -> &ActiveVoiceList {
        &self.active
    }

    /// Voices summed in the last Polyphonic block (1 for the single-voice modes).
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.contributors = 0;
    }

    /// Render one block of at most `MAX_BLOCK_SIZE` frames.
    pub fn render<G, E>(
        &mut self,
        mode: VoiceMode,
        allocator: &mut AllocatorCore,
        voices: &mut [Voice<G, E>],
        unison: &mut UnisonStack<G>,
        left: &mut [f32],
        right: &mut [f32],
    ) where
        G: PitchedGenerator,
        E: EnvelopeGenerator,
    {
        let frames = left.len().min(right.len()).min(self.scratch.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        clear_stereo(left, right);
        self.contributors = 0;

        match mode {
            VoiceMode::Monophonic | VoiceMode::Unison => {
                if let Some(voice) = voices.first_mut() {
                    if voice.is_sounding() {
                        if mode == VoiceMode::Unison {
                            voice.render_unison(unison, left, right);
                        } else {
                            voice.render(left);
                            right.copy_from_slice(left);
                        }
                        self.contributors = 1;
                    } else {
                        voice.glide_mut().advance(frames as u32);
                    }
                }
            }
            VoiceMode::Polyphonic => {
                let scratch = &mut self.scratch[..frames];
                for index in self.active.iter() {
                    let Some(voice) = voices.get_mut(index) else {
                        continue;
                    };
                    if !voice.is_sounding() {
                        continue;
                    }
                    voice.render(scratch);
                    sum_in_place(left, scratch);
                    self.contributors += 1;
                }

                scale_in_place(left, equal_power_gain(self.contributors));
                right.copy_from_slice(left);
            }
        }

        self.prune(mode, allocator, voices);
    }

    fn prune<G, E>(&mut self, mode: VoiceMode, allocator: &mut AllocatorCore, voices: &mut [Voice<G, E>])
    where
        G: PitchedGenerator,
        E: EnvelopeGenerator,
    {
        let single_voice = mode.is_single_voice();

        self.active.retain(|index| {
            let rendered = !single_voice || index == 0;
            let sounding = rendered && voices.get(index).is_some_and(|v| v.is_sounding());
            if !sounding {
                if let Some(voice) = voices.get_mut(index) {
                    voice.silence();
                }
                allocator.set_voice_active(index, false);
            }
            sounding
        });
    }
}

impl Default for RenderDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
