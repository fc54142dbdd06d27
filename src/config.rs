#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Envelope timings for a sustained limb voice, in seconds (levels 0.0-1.0).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct VoiceEnvelope {
    pub attack: f64,
    pub decay: f64,
    /// Level reached at the end of the attack.
    pub peak: f32,
    /// Level held after the decay until release.
    pub sustain: f32,
    /// Release used by an explicit stop.
    pub release: f64,
    /// Shorter release forced onto a voice evicted by the steal policy.
    pub steal_release: f64,
    /// Safety margin past the release ramp before the voice's nodes are freed.
    pub cleanup_margin: f64,
}

impl Default for VoiceEnvelope {
    fn default() -> Self {
        Self {
            attack: 0.12,
            decay: 0.18,
            peak: 0.6,
            sustain: 0.55,
            release: 0.35,
            steal_release: 0.18,
            cleanup_margin: 0.08,
        }
    }
}

/// Engine tunables.
///
/// Every constant the control surface exposes lives here so hosts can tweak
/// behaviour without touching the synthesis code. The defaults are the values
/// the creature ships with.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Ceiling on concurrently allocated voices; see the oldest-first steal
    /// policy in `synth::manager`.
    pub max_voices: usize,
    /// Supported tempo range in BPM. `set_beat_tempo` clamps into it.
    pub min_bpm: u32,
    pub max_bpm: u32,
    pub default_bpm: u32,
    /// How far ahead of the render clock the beat scheduler fills in events.
    pub lookahead: f64,
    /// Recommended interval between control-side scheduling ticks. The
    /// engine itself runs a pass per rendered block, which is tighter.
    pub tick_interval: f64,
    /// Gap between `start_beat` and the first step.
    pub lead_in: f64,
    pub voice: VoiceEnvelope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 8,
            min_bpm: 70,
            max_bpm: 130,
            default_bpm: 92,
            lookahead: 0.12,
            tick_interval: 0.025,
            lead_in: 0.05,
            voice: VoiceEnvelope::default(),
        }
    }
}
