/*
Portamento in the Log-Frequency Domain
======================================

Pitch is perceived logarithmically: an octave is a doubling, whatever the
starting frequency. Gliding linearly in Hz makes the low end of a glide crawl
and the top end rush. Instead we glide on ln(frequency):

    increment = ln(target_hz / current_hz) / (glide_seconds * sample_rate)

and add `increment` to the running log-frequency once per sample. The number
of steps is fixed by the glide time alone, so a semitone and two octaves both
take exactly `round(glide_seconds * sample_rate)` samples. Only the size of
each step differs.

    ln(f)
      |              ______ target (two octaves)
      |           __/
      |        __/   ______ target (one octave)
      |     __/  ___/
      |  __/ ___/
      |_/___/
      +--------------------> samples
      0                  N          (same N for both)

On the final step the running value is snapped onto the target so rounding
never leaves the voice a few cents flat.
*/

/// Per-voice pitch state with optional glide.
#[derive(Debug, Clone, Copy, Default)]
pub struct Glide {
    log_current: f32,
    log_target: f32,
    increment: f32,
    remaining: u32,
    pitched: bool,
}

impl Glide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump straight to `hz`, cancelling any running glide.
    pub fn set_immediate(&mut self, hz: f32) {
        let log_hz = hz.max(f32::MIN_POSITIVE).ln();
        self.log_current = log_hz;
        self.log_target = log_hz;
        self.increment = 0.0;
        self.remaining = 0;
        self.pitched = true;
    }

    /// Start a glide from the current pitch to `target_hz` over `seconds`.
    ///
    /// A glide time shorter than one sample degenerates to an immediate jump.
    pub fn glide_to(&mut self, target_hz: f32, seconds: f32, sample_rate: f32) {
        let steps = (seconds * sample_rate).round();
        if !self.has_pitch() || steps < 1.0 {
            self.set_immediate(target_hz);
            return;
        }

        let current_hz = self.current_hz();
        self.log_target = target_hz.max(f32::MIN_POSITIVE).ln();
        self.increment = (target_hz / current_hz).ln() / (seconds * sample_rate);
        self.remaining = steps as u32;
    }

    /// Advance one sample and return the frequency to play.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.log_current = if self.remaining == 0 {
                self.log_target
            } else {
                self.log_current + self.increment
            };
        }
        self.log_current.exp()
    }

    /// Advance `frames` samples at once. Used when a voice is skipped for a block.
    pub fn advance(&mut self, frames: u32) {
        if frames >= self.remaining {
            if self.remaining > 0 {
                self.log_current = self.log_target;
            }
            self.remaining = 0;
        } else {
            self.remaining -= frames;
            self.log_current += self.increment * frames as f32;
        }
    }

    pub fn is_gliding(&self) -> bool {
        self.remaining > 0
    }

    /// True once any pitch has been set.
    pub fn has_pitch(&self) -> bool {
        self.pitched
    }

    pub fn current_hz(&self) -> f32 {
        self.log_current.exp()
    }

    pub fn target_hz(&self) -> f32 {
        self.log_target.exp()
    }

    /// Per-sample step in natural-log units.
    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Samples left until the target is reached.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
