use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| response  | passes          | used by                                 |
| --------- | --------------- | --------------------------------------- |
| low-pass  | below cutoff    | voice body, master tone, reverb tone    |
| high-pass | above cutoff    | hi-hats                                 |
| band-pass | around cutoff   | snare rattle, voice breath layer        |

Topology-preserving state-variable filter. Two integrators with prewarped
gain; all three responses fall out of the same per-sample update, the mode
just selects which output is returned.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    mode: FilterMode,
    cutoff_hz: f32,
    q: f32,
}

impl SVFilter {
    pub fn new(mode: FilterMode, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            mode,
            cutoff_hz,
            q: q.max(0.01),
        }
    }

    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterMode::LowPass, cutoff_hz, q)
    }

    pub fn highpass(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterMode::HighPass, cutoff_hz, q)
    }

    pub fn bandpass(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterMode::BandPass, cutoff_hz, q)
    }

    /// Retarget the cutoff. Cheap enough to call per sample, which is how
    /// the sustained voice sweeps its filter from an automation lane.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        // Bilinear prewarp so the analog cutoff lands on the digital one.
        let clamped = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        (TAU * clamped / (2.0 * sample_rate)).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, sample_rate: f32) -> f32 {
        let g = self.compute_g(sample_rate);
        let k = 1.0 / self.q;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.mode {
            FilterMode::LowPass => v2,
            FilterMode::BandPass => v1,
            FilterMode::HighPass => sample - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
