//! Hi-hat one-shots, closed and open.
//!
//! High-passed noise with a fast exponential envelope. The closed hat is a
//! tight "tss" under a tenth of a second; the open variant rings louder and
//! roughly twice as long.

use crate::dsp::filter::SVFilter;
use crate::dsp::noise::{NoiseLoop, NoiseTable};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::param::Param;
use crate::MIN_LEVEL;

const HAT_HIGHPASS_HZ: f32 = 6_000.0;
const HAT_Q: f32 = 0.7;
const PEAK_AT: f64 = 0.005;

const CLOSED_PEAK: f32 = 0.2;
const CLOSED_GAIN_END: f64 = 0.08;
const CLOSED_TOTAL: f64 = 0.09;

const OPEN_PEAK: f32 = 0.28;
const OPEN_GAIN_END: f64 = 0.2;
const OPEN_TOTAL: f64 = 0.22;

pub struct HatVoice {
    noise: NoiseLoop,
    filter: SVFilter,
    gain: Param,
    start: f64,
    end: f64,
    done: bool,
}

impl HatVoice {
    pub fn closed(at: f64, noise: &NoiseTable) -> Self {
        Self::build(at, noise, CLOSED_PEAK, CLOSED_GAIN_END, CLOSED_TOTAL)
    }

    pub fn open(at: f64, noise: &NoiseTable) -> Self {
        Self::build(at, noise, OPEN_PEAK, OPEN_GAIN_END, OPEN_TOTAL)
    }

    fn build(at: f64, noise: &NoiseTable, peak: f32, gain_end: f64, total: f64) -> Self {
        let mut gain = Param::new(MIN_LEVEL);
        gain.set_value_at(MIN_LEVEL, at);
        gain.exp_ramp_to(peak, at + PEAK_AT);
        gain.exp_ramp_to(MIN_LEVEL, at + gain_end);

        Self {
            noise: NoiseLoop::with_offset(noise.clone(), (at * 104_729.0) as usize),
            filter: SVFilter::highpass(HAT_HIGHPASS_HZ, HAT_Q),
            gain,
            start: at,
            end: at + total,
            done: false,
        }
    }
}

impl GraphNode for HatVoice {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.time_at(i);
            if t < self.start || t >= self.end {
                *sample = 0.0;
                continue;
            }

            let hiss = self
                .filter
                .next_sample(self.noise.next_sample(), ctx.sample_rate);
            *sample = hiss * self.gain.step_to(t);
        }

        if ctx.time_at(out.len()) >= self.end {
            self.done = true;
        }
    }

    fn is_active(&self) -> bool {
        !self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_of(block: &[f32]) -> f32 {
        block.iter().fold(0.0f32, |a, &s| a.max(s.abs()))
    }

    #[test]
    fn closed_hat_is_shorter_and_quieter_than_open() {
        let table = NoiseTable::with_seed(SAMPLE_RATE, 5);
        let frames = (0.25 * SAMPLE_RATE as f64) as usize;

        let mut closed = HatVoice::closed(0.0, &table);
        let mut closed_block = vec![0.0f32; frames];
        closed.render_block(&mut closed_block, &RenderCtx::new(SAMPLE_RATE, 0.0));

        let mut open = HatVoice::open(0.0, &table);
        let mut open_block = vec![0.0f32; frames];
        open.render_block(&mut open_block, &RenderCtx::new(SAMPLE_RATE, 0.0));

        // The closed hat is gone by 100 ms while the open hat still rings.
        let at_150ms = (0.15 * SAMPLE_RATE as f64) as usize;
        assert!(peak_of(&closed_block[at_150ms..]) < 1e-3);
        assert!(peak_of(&open_block[at_150ms..]) > 1e-3);

        assert!(peak_of(&open_block) > peak_of(&closed_block));
        assert!(!closed.is_active());
        assert!(!open.is_active());
    }

    #[test]
    fn hat_is_bright() {
        // High-passed noise should carry almost no sub content; compare the
        // average magnitude against an unfiltered noise burst.
        let table = NoiseTable::with_seed(SAMPLE_RATE, 5);
        let mut hat = HatVoice::closed(0.0, &table);
        let frames = (0.05 * SAMPLE_RATE as f64) as usize;
        let mut block = vec![0.0f32; frames];
        hat.render_block(&mut block, &RenderCtx::new(SAMPLE_RATE, 0.0));

        let mean: f32 = block.iter().sum::<f32>() / frames as f32;
        assert!(mean.abs() < 0.01, "high-passed noise should center on zero");
        assert!(peak_of(&block) > 0.01);
    }
}
