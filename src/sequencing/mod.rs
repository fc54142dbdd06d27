pub mod pattern;
pub mod scheduler;

pub use pattern::{StepPattern, STEPS_PER_BAR};
pub use scheduler::{BeatScheduler, DrumHit, DrumKind};
