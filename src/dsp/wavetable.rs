use std::f32::consts::TAU;

/// Default single-cycle table length. A power of two so wrapping is a mask.
pub const DEFAULT_TABLE_SIZE: usize = 2048;

/// Single-cycle lookup table.
///
/// Tables are computed once, wrapped in an `Arc` by the voice factory and
/// shared read-only by every oscillator of a unit. There is no process-wide
/// table: two engines built from two factories own two tables.
#[derive(Debug)]
pub struct Wavetable {
    samples: Box<[f32]>,
    mask: usize,
}

impl Wavetable {
    /// Build a sine table. `size` is rounded up to the next power of two.
    pub fn sine(size: usize) -> Self {
        let size = size.max(4).next_power_of_two();
        let samples = (0..size)
            .map(|i| (TAU * i as f32 / size as f32).sin())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            samples,
            mask: size - 1,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Linearly interpolated read. `phase` is in cycles, `[0, 1)`.
    #[inline]
    pub fn lookup(&self, phase: f32) -> f32 {
        let position = phase * self.samples.len() as f32;
        let index = position as usize;
        let frac = position - index as f32;

        let a = self.samples[index & self.mask];
        let b = self.samples[(index + 1) & self.mask];
        a + (b - a) * frac
    }
}
