pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph;
pub mod sequencing; // Drum patterns and lookahead scheduling
pub mod synth; // Voice management and polyphony
pub mod voices; // Instrument and drum recipes

pub use config::EngineConfig;
pub use engine::AudioEngine;
#[cfg(feature = "rtrb")]
pub use engine::EngineHandle;
pub use error::EngineError;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Floor for exponential automation. An exponential ramp can never reach
/// zero, so "silence" is this value and all ramp endpoints clamp to it.
pub(crate) const MIN_LEVEL: f32 = 1.0e-4;
