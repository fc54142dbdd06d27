use thiserror::Error;

/// Errors surfaced by the engine's control surface.
///
/// The domain operations themselves cannot fail: stopping an absent voice or
/// re-starting a running beat are defined as no-ops. The only observable
/// failure is the host render side being unavailable when a wake is requested.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The render side of the engine is gone or not yet attached, so control
    /// messages have nowhere to land. Callers should defer further control
    /// calls until a later `resume` succeeds.
    #[error("audio output is not ready")]
    OutputNotReady,
}
