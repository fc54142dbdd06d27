#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Maximum pitches a single voice can carry. Chords in practice use three;
/// the headroom costs nothing because the set is a fixed array.
pub const MAX_PITCHES: usize = 8;

/// Fixed-capacity set of fundamental frequencies, `Copy` so control messages
/// cross the ring buffer without allocating.
#[derive(Debug, Clone, Copy)]
pub struct PitchSet {
    freqs: [f32; MAX_PITCHES],
    len: u8,
}

impl PitchSet {
    /// Build from a slice, silently truncating past `MAX_PITCHES`.
    pub fn from_slice(freqs: &[f32]) -> Self {
        let mut set = Self {
            freqs: [0.0; MAX_PITCHES],
            len: 0,
        };
        for &f in freqs.iter().take(MAX_PITCHES) {
            set.freqs[set.len as usize] = f;
            set.len += 1;
        }
        set
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.freqs[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Control-surface messages. All fire-and-forget; none carries a reply.
#[derive(Debug, Clone, Copy)]
pub enum EngineMessage {
    StartVoice { id: u32, pitches: PitchSet },
    StopVoice { id: u32 },
    StopAllVoices,
    StartBeat,
    StopBeat,
    SetTempo { bpm: u32 },
    Resume,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_set_round_trips() {
        let set = PitchSet::from_slice(&[220.0, 261.63, 329.63]);
        assert_eq!(set.as_slice(), &[220.0, 261.63, 329.63]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn pitch_set_truncates_oversized_input() {
        let twelve: Vec<f32> = (0..12).map(|i| 100.0 + i as f32).collect();
        let set = PitchSet::from_slice(&twelve);
        assert_eq!(set.len(), MAX_PITCHES);
        assert_eq!(set.as_slice()[0], 100.0);
    }

    #[test]
    fn empty_pitch_set() {
        let set = PitchSet::from_slice(&[]);
        assert!(set.is_empty());
        assert_eq!(set.as_slice().len(), 0);
    }
}
