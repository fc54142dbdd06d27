//! Snare one-shot.
//!
//! Band-pass filtered noise is the wire rattle; a triangle at 210 Hz is the
//! drum-head body underneath it. The noise burst decays over 0.2 s, the body
//! slightly faster, so the hit opens with tone and trails off as buzz.

use crate::dsp::filter::SVFilter;
use crate::dsp::noise::{NoiseLoop, NoiseTable};
use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::param::Param;
use crate::MIN_LEVEL;

const RATTLE_BAND_HZ: f32 = 1_800.0;
const RATTLE_BAND_Q: f32 = 0.7;
const RATTLE_PEAK: f32 = 0.5;
const RATTLE_PEAK_AT: f64 = 0.01;
const RATTLE_END: f64 = 0.2;
const BODY_HZ: f32 = 210.0;
const BODY_PEAK: f32 = 0.18;
const BODY_PEAK_AT: f64 = 0.02;
const BODY_END: f64 = 0.18;
const TOTAL_SECONDS: f64 = 0.22;

pub struct SnareVoice {
    noise: NoiseLoop,
    rattle_filter: SVFilter,
    rattle_gain: Param,
    body: OscillatorBlock,
    body_gain: Param,
    start: f64,
    end: f64,
    done: bool,
}

impl SnareVoice {
    pub fn new(at: f64, noise: &NoiseTable) -> Self {
        let mut rattle_gain = Param::new(MIN_LEVEL);
        rattle_gain.set_value_at(MIN_LEVEL, at);
        rattle_gain.exp_ramp_to(RATTLE_PEAK, at + RATTLE_PEAK_AT);
        rattle_gain.exp_ramp_to(MIN_LEVEL, at + RATTLE_END);

        let mut body_gain = Param::new(MIN_LEVEL);
        body_gain.set_value_at(MIN_LEVEL, at);
        body_gain.exp_ramp_to(BODY_PEAK, at + BODY_PEAK_AT);
        body_gain.exp_ramp_to(MIN_LEVEL, at + BODY_END);

        Self {
            noise: NoiseLoop::with_offset(noise.clone(), (at * 7_919.0) as usize),
            rattle_filter: SVFilter::bandpass(RATTLE_BAND_HZ, RATTLE_BAND_Q),
            rattle_gain,
            body: OscillatorBlock::triangle(),
            body_gain,
            start: at,
            end: at + TOTAL_SECONDS,
            done: false,
        }
    }
}

impl GraphNode for SnareVoice {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.time_at(i);
            if t < self.start || t >= self.end {
                *sample = 0.0;
                continue;
            }

            let rattle = self
                .rattle_filter
                .next_sample(self.noise.next_sample(), ctx.sample_rate)
                * self.rattle_gain.step_to(t);
            let body =
                self.body.next_sample(BODY_HZ, ctx.sample_rate) * self.body_gain.step_to(t);
            *sample = rattle + body;
        }

        if ctx.time_at(out.len()) >= self.end {
            self.done = true;
        }
    }

    fn is_active(&self) -> bool {
        !self.done
    }
}
