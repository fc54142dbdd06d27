//! Vinyl-noise texture.
//!
//! A quiet, dark noise loop that runs underneath the drum pattern while the
//! beat is playing. It fills the silence between hits the way surface noise
//! fills a record, which keeps the groove from sounding sequenced.

use crate::dsp::filter::SVFilter;
use crate::dsp::noise::{NoiseLoop, NoiseTable};
use crate::graph::node::RenderCtx;

const VINYL_CUTOFF_HZ: f32 = 2_500.0;
const VINYL_Q: f32 = 0.2;
const VINYL_LEVEL: f32 = 0.015;

pub struct VinylLoop {
    noise: NoiseLoop,
    filter: SVFilter,
    running: bool,
}

impl VinylLoop {
    pub fn new(noise: &NoiseTable) -> Self {
        Self {
            noise: NoiseLoop::new(noise.clone()),
            filter: SVFilter::lowpass(VINYL_CUTOFF_HZ, VINYL_Q),
            running: false,
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Render the texture, overwriting `out`; silent while stopped.
    pub fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.running {
            out.fill(0.0);
            return;
        }
        for sample in out.iter_mut() {
            let hiss = self
                .filter
                .next_sample(self.noise.next_sample(), ctx.sample_rate);
            *sample = hiss * VINYL_LEVEL;
        }
    }
}
