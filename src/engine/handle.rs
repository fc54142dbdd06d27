use log::warn;
use rtrb::Producer;

use crate::error::EngineError;
use crate::synth::message::{EngineMessage, PitchSet};

/// Control-surface handle for a [`crate::AudioEngine`] living on another
/// thread (typically the host's audio callback).
///
/// Every method is fire-and-forget: messages are pushed onto a wait-free
/// ring and applied by the engine at its next block boundary. Nothing here
/// blocks, allocates, or returns domain errors; per the engine's contract,
/// invalid operations degrade to no-ops on the render side.
pub struct EngineHandle {
    tx: Producer<EngineMessage>,
}

impl EngineHandle {
    pub(crate) fn new(tx: Producer<EngineMessage>) -> Self {
        Self { tx }
    }

    pub fn start_voice(&mut self, id: u32, frequencies: &[f32]) {
        self.send(EngineMessage::StartVoice {
            id,
            pitches: PitchSet::from_slice(frequencies),
        });
    }

    pub fn stop_voice(&mut self, id: u32) {
        self.send(EngineMessage::StopVoice { id });
    }

    pub fn stop_all_voices(&mut self) {
        self.send(EngineMessage::StopAllVoices);
    }

    pub fn start_beat(&mut self) {
        self.send(EngineMessage::StartBeat);
    }

    pub fn stop_beat(&mut self) {
        self.send(EngineMessage::StopBeat);
    }

    pub fn set_beat_tempo(&mut self, bpm: u32) {
        self.send(EngineMessage::SetTempo { bpm });
    }

    /// Ask a suspended engine to produce sound again.
    ///
    /// The one operation with an observable failure: when the render side
    /// has been dropped there is nothing to wake, and the caller should hold
    /// further control traffic until a later `resume` succeeds.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.tx.is_abandoned() {
            return Err(EngineError::OutputNotReady);
        }
        self.send(EngineMessage::Resume);
        Ok(())
    }

    fn send(&mut self, message: EngineMessage) {
        if self.tx.push(message).is_err() {
            // The ring only fills when the render side stalls; dropping a
            // control message is preferable to blocking the UI thread.
            warn!("control ring full, dropped {message:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioEngine, EngineConfig};

    #[test]
    fn resume_reports_missing_render_side() {
        let (engine, mut handle) = AudioEngine::with_control_channel(EngineConfig::default());
        assert_eq!(handle.resume(), Ok(()));

        drop(engine);
        assert_eq!(handle.resume(), Err(EngineError::OutputNotReady));
    }

    #[test]
    fn control_messages_do_not_panic_when_ring_fills() {
        let (engine, mut handle) = AudioEngine::with_control_channel(EngineConfig::default());
        for id in 0..10_000 {
            handle.start_voice(id, &[220.0]);
        }
        drop(engine);
    }
}
