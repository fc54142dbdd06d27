use std::f32::consts::TAU;

use crate::dsp::delay::DelayLine;
use crate::graph::node::RenderCtx;

/*
Chorus
======

Thickens the sustained voices by layering the dry signal with two short
delay taps whose delay times drift slowly in opposite character. The drift
produces tiny pitch deviations, which reads as several players on the same
part instead of one.

The two taps sit at different base delays (12 ms and 15 ms) and are swept by
independent low-frequency oscillators (0.25 Hz and 0.33 Hz, about 2 ms deep).
Incommensurate rates keep the pair from ever lining up, so the shimmer never
cycles audibly. The wet mix is deliberately low; the effect should be felt,
not heard as an effect.
*/

const BASE_DELAYS: [f32; 2] = [0.012, 0.015];
const LFO_RATES: [f32; 2] = [0.25, 0.33];
const LFO_DEPTH: f32 = 0.002;
const DRY_LEVEL: f32 = 0.9;
const WET_LEVEL: f32 = 0.12;

pub struct ChorusNode {
    taps: [ChorusTap; 2],
}

struct ChorusTap {
    delay: DelayLine,
    base_delay: f32,
    lfo_rate: f32,
    lfo_phase: f32,
}

impl ChorusTap {
    fn new(base_delay: f32, lfo_rate: f32, sample_rate: f32) -> Self {
        Self {
            delay: DelayLine::new(0.05, sample_rate),
            base_delay,
            lfo_rate,
            lfo_phase: 0.0,
        }
    }

    #[inline]
    fn next_sample(&mut self, input: f32, sample_rate: f32) -> f32 {
        let delay_seconds = self.base_delay + self.lfo_phase.sin() * LFO_DEPTH;
        let wet = self.delay.read_interpolated(delay_seconds * sample_rate);
        self.delay.write(input);

        self.lfo_phase += TAU * self.lfo_rate / sample_rate;
        if self.lfo_phase >= TAU {
            self.lfo_phase -= TAU;
        }

        wet
    }
}

impl ChorusNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            taps: [
                ChorusTap::new(BASE_DELAYS[0], LFO_RATES[0], sample_rate),
                ChorusTap::new(BASE_DELAYS[1], LFO_RATES[1], sample_rate),
            ],
        }
    }

    /// Process the buffer in place: dry passthrough plus the two wet taps.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            let dry = *sample;
            let mut wet = 0.0;
            for tap in &mut self.taps {
                wet += tap.next_sample(dry, ctx.sample_rate);
            }
            *sample = dry * DRY_LEVEL + wet * WET_LEVEL;
        }
    }

    pub fn reset(&mut self) {
        for tap in &mut self.taps {
            tap.delay.reset();
            tap.lfo_phase = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::new(48_000.0, 0.0)
    }

    #[test]
    fn silence_in_silence_out() {
        let mut chorus = ChorusNode::new(48_000.0);
        let mut buffer = vec![0.0f32; 512];
        chorus.render(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn dry_path_dominates() {
        let mut chorus = ChorusNode::new(48_000.0);
        let mut buffer = vec![0.5f32; 64];
        chorus.render(&mut buffer, &ctx());
        // The delay lines are still empty, so the first samples are pure dry.
        assert!((buffer[0] - 0.5 * DRY_LEVEL).abs() < 1e-6);
    }

    #[test]
    fn wet_taps_arrive_after_their_delay() {
        let sample_rate = 48_000.0;
        let mut chorus = ChorusNode::new(sample_rate);

        // Feed a constant signal long enough to fill both delay lines.
        let mut warmup = vec![0.25f32; 2048];
        chorus.render(&mut warmup, &ctx());

        let mut buffer = vec![0.25f32; 64];
        chorus.render(&mut buffer, &ctx());

        // With warm delay lines the output exceeds the dry-only level.
        let dry_only = 0.25 * DRY_LEVEL;
        assert!(buffer.iter().all(|&s| s > dry_only));
    }

    #[test]
    fn output_stays_bounded() {
        let mut chorus = ChorusNode::new(48_000.0);
        let mut buffer: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.07).sin()).collect();
        chorus.render(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| s.abs() < 1.5 && s.is_finite()));
    }
}
