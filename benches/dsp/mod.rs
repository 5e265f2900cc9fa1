//! Benchmarks for low-level DSP primitives.

mod envelope;
mod glide;
mod mix;
mod oscillator;
mod unison;

pub use envelope::bench_envelope;
pub use glide::bench_glide;
pub use mix::bench_mix;
pub use oscillator::bench_oscillator;
pub use unison::bench_unison;
