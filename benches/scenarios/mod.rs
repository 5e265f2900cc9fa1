//! Whole-engine benchmarks.
//!
//! These drive `VoiceEngine` the way a unit's audio callback does: control
//! messages first, then one render per block.

mod allocation;
mod modes;

pub use allocation::bench_allocation;
pub use modes::bench_modes;
