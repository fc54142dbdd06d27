//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; timing, automation and routing live in the
//! `graph`, `voices` and `engine` layers.

/// Time-domain delay line with optional interpolated reads.
pub mod delay;
/// State-variable filter with low/high/band-pass responses.
pub mod filter;
/// Shared white-noise table and looping readers.
pub mod noise;
/// Oscillator waveforms.
pub mod oscillator;
/// Waveshaping saturation.
pub mod waveshaper;

pub use noise::{NoiseLoop, NoiseTable};
