//! Kick drum one-shot.
//!
//! A sine body whose pitch sweeps 140 -> 48 Hz while an exponential gain
//! envelope rises fast and dies within a quarter second; the drop is the
//! classic electronic-kick "punch". A very short square-wave click at
//! 2.2 kHz rides on top to give the hit attack definition that survives the
//! master low-pass.
//!
//! # Variations
//!
//! - Longer gain decay = boomier, 808-flavored kick
//! - Higher sweep start = more knock, less weight

use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::param::Param;
use crate::MIN_LEVEL;

const SWEEP_START_HZ: f32 = 140.0;
const SWEEP_END_HZ: f32 = 48.0;
const SWEEP_SECONDS: f64 = 0.18;
const BODY_PEAK: f32 = 0.8;
const BODY_PEAK_AT: f64 = 0.02;
const BODY_END: f64 = 0.22;
const CLICK_HZ: f32 = 2_200.0;
const CLICK_PEAK: f32 = 0.2;
const CLICK_PEAK_AT: f64 = 0.005;
const CLICK_END: f64 = 0.03;
const TOTAL_SECONDS: f64 = 0.24;

pub struct KickVoice {
    body: OscillatorBlock,
    frequency: Param,
    body_gain: Param,
    click: OscillatorBlock,
    click_gain: Param,
    start: f64,
    end: f64,
    done: bool,
}

impl KickVoice {
    /// Schedule a kick whose first sample lands at the absolute time `at`.
    pub fn new(at: f64) -> Self {
        let mut frequency = Param::new(SWEEP_START_HZ);
        frequency.set_value_at(SWEEP_START_HZ, at);
        frequency.exp_ramp_to(SWEEP_END_HZ, at + SWEEP_SECONDS);

        let mut body_gain = Param::new(MIN_LEVEL);
        body_gain.set_value_at(MIN_LEVEL, at);
        body_gain.exp_ramp_to(BODY_PEAK, at + BODY_PEAK_AT);
        body_gain.exp_ramp_to(MIN_LEVEL, at + BODY_END);

        let mut click_gain = Param::new(MIN_LEVEL);
        click_gain.set_value_at(MIN_LEVEL, at);
        click_gain.exp_ramp_to(CLICK_PEAK, at + CLICK_PEAK_AT);
        click_gain.exp_ramp_to(MIN_LEVEL, at + CLICK_END);

        Self {
            body: OscillatorBlock::sine(),
            frequency,
            body_gain,
            click: OscillatorBlock::square(),
            click_gain,
            start: at,
            end: at + TOTAL_SECONDS,
            done: false,
        }
    }
}

impl GraphNode for KickVoice {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.time_at(i);
            if t < self.start || t >= self.end {
                *sample = 0.0;
                continue;
            }

            let freq = self.frequency.step_to(t);
            let body = self.body.next_sample(freq, ctx.sample_rate) * self.body_gain.step_to(t);
            let click =
                self.click.next_sample(CLICK_HZ, ctx.sample_rate) * self.click_gain.step_to(t);
            *sample = body + click;
        }

        if ctx.time_at(out.len()) >= self.end {
            self.done = true;
        }
    }

    fn is_active(&self) -> bool {
        !self.done
    }
}
