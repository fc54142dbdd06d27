use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

/// Single phase-accumulating oscillator.
///
/// Frequency is supplied per sample rather than stored, so callers can drive
/// it from an automation lane (the kick drum sweeps its pitch this way).
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    /// Produce one sample at the given frequency, then advance the phase.
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let normalized = self.phase / TAU; // 0.0..1.0
        let value = match self.waveform {
            Waveform::Sine => self.phase.sin(),
            Waveform::Sawtooth => 2.0 * normalized - 1.0,
            Waveform::Square => {
                if normalized < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (normalized - 0.5).abs() - 1.0,
        };

        self.phase += TAU * frequency / sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        value
    }

    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Apply a detune in cents: frequency * 2^(cents / 1200).
#[inline]
pub fn detune(frequency: f32, cents: f32) -> f32 {
    if cents == 0.0 {
        frequency
    } else {
        frequency * 2.0_f32.powf(cents / 1200.0)
    }
}
