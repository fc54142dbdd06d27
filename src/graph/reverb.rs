use crate::dsp::delay::DelayLine;
use crate::dsp::filter::SVFilter;
use crate::graph::node::RenderCtx;

/*
Multi-tap Feedback Reverb
=========================

    input -> [tone LPF] --+--> [delay 70ms]  --*0.42--+
                          +--> [delay 110ms] --*0.34--+--> (*0.45) -> out
                          +--> [delay 160ms] --*0.26--+
                          +--> [delay 220ms] --*0.18--+

Each delay feeds 25% of its own output back into itself, so a single input
impulse produces a train of echoes that fades geometrically. Four taps at
non-multiple times overlap into a tail dense enough to pass as a small room
behind the sustained voices.

The tone filter in front keeps highs out of the tail; bright reverb reads as
metal, dark reverb as air.
*/

const TAP_DELAYS: [f32; 4] = [0.07, 0.11, 0.16, 0.22];
const TAP_GAINS: [f32; 4] = [0.42, 0.34, 0.26, 0.18];
const TAP_FEEDBACK: f32 = 0.25;
const TONE_CUTOFF: f32 = 3_200.0;
const OUTPUT_LEVEL: f32 = 0.45;

pub struct ReverbNode {
    tone: SVFilter,
    taps: [ReverbTap; 4],
}

struct ReverbTap {
    delay: DelayLine,
    delay_samples: usize,
    gain: f32,
}

impl ReverbTap {
    fn new(delay_seconds: f32, gain: f32, sample_rate: f32) -> Self {
        Self {
            delay: DelayLine::new(0.3, sample_rate),
            delay_samples: (delay_seconds * sample_rate) as usize,
            gain,
        }
    }

    #[inline]
    fn next_sample(&mut self, input: f32) -> f32 {
        let echoed = self.delay.read(self.delay_samples);
        self.delay.write(input + echoed * TAP_FEEDBACK);
        echoed * self.gain
    }
}

impl ReverbNode {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            tone: SVFilter::lowpass(TONE_CUTOFF, 0.2),
            taps: [
                ReverbTap::new(TAP_DELAYS[0], TAP_GAINS[0], sample_rate),
                ReverbTap::new(TAP_DELAYS[1], TAP_GAINS[1], sample_rate),
                ReverbTap::new(TAP_DELAYS[2], TAP_GAINS[2], sample_rate),
                ReverbTap::new(TAP_DELAYS[3], TAP_GAINS[3], sample_rate),
            ],
        }
    }

    /// Process the buffer in place. The input is the reverb send; the result
    /// is wet signal only, already scaled to the bus output level.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            let toned = self.tone.next_sample(*sample, ctx.sample_rate);
            let mut wet = 0.0;
            for tap in &mut self.taps {
                wet += tap.next_sample(toned);
            }
            *sample = wet * OUTPUT_LEVEL;
        }
    }

    pub fn reset(&mut self) {
        self.tone.reset();
        for tap in &mut self.taps {
            tap.delay.reset();
        }
    }
}
