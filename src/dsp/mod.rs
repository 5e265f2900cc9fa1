//! Low-level DSP primitives consumed by the voice engine.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside voice structs. The engine only
//! talks to them through the traits in [`crate::synth::generator`], so any of
//! them can be swapped for a unit-specific generator.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Constant-time portamento in the log-frequency domain.
pub mod glide;
/// Summing and gain helpers for voice mixing.
pub mod mix;
/// Phase-accumulating oscillator waveforms.
pub mod oscillator;
/// Detuned oscillator stack for unison mode.
pub mod unison;
/// Shared single-cycle lookup tables.
pub mod wavetable;

pub use envelope::EnvelopeState;
