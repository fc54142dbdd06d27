use crate::dsp::filter::SVFilter;
use crate::dsp::noise::NoiseTable;
use crate::dsp::waveshaper::Saturator;
use crate::graph::chorus::ChorusNode;
use crate::graph::node::RenderCtx;
use crate::graph::reverb::ReverbNode;
use crate::voices::vinyl::VinylLoop;
use crate::MAX_BLOCK_SIZE;

/*
Effects Bus
===========

The one long-lived signal graph in the engine. Built once, never torn down
while the engine lives; voices and drum hits only feed buffers into it.

  voice dry  ---> [chorus] -----------------------------+
  voice send ---> [reverb] -----------------------------+--(*0.95)--+
                                                                    +--> out
  drums ---> [saturation] -> [tone LPF 8.5 kHz] --+                 |
  vinyl  --> [LPF 2.5 kHz] -> (*0.015) -----------+--(*0.22)--------+

The sustained voices get width (chorus) and air (reverb); the drums get
warmth (saturation) and a rounded top (tone filter). The vinyl loop bypasses
the drum saturation on purpose: it is meant to sit behind the kit, not to be
part of it.
*/

const STRINGS_LEVEL: f32 = 0.95;
const DRUM_MASTER_LEVEL: f32 = 0.22;
const DRUM_SATURATION_DRIVE: f32 = 0.35;
const DRUM_TONE_CUTOFF_HZ: f32 = 8_500.0;
const DRUM_TONE_Q: f32 = 0.2;

pub struct EffectsBus {
    chorus: ChorusNode,
    reverb: ReverbNode,
    drum_saturator: Saturator,
    drum_tone: SVFilter,
    vinyl: VinylLoop,
    vinyl_buf: Vec<f32>,
}

impl EffectsBus {
    pub fn new(sample_rate: f32, noise: &NoiseTable) -> Self {
        Self {
            chorus: ChorusNode::new(sample_rate),
            reverb: ReverbNode::new(sample_rate),
            drum_saturator: Saturator::new(DRUM_SATURATION_DRIVE),
            drum_tone: SVFilter::lowpass(DRUM_TONE_CUTOFF_HZ, DRUM_TONE_Q),
            vinyl: VinylLoop::new(noise),
            vinyl_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn set_vinyl_running(&mut self, running: bool) {
        self.vinyl.set_running(running);
    }

    pub fn vinyl_running(&self) -> bool {
        self.vinyl.is_running()
    }

    /// Process one block. `voice` and `voice_send` are consumed in place by
    /// the chorus and reverb; `drums` by the saturation chain. The summed
    /// result overwrites `out`.
    pub fn render_block(
        &mut self,
        voice: &mut [f32],
        voice_send: &mut [f32],
        drums: &mut [f32],
        out: &mut [f32],
        ctx: &RenderCtx,
    ) {
        let frames = out.len();

        self.chorus.render(voice, ctx);
        self.reverb.render(voice_send, ctx);

        self.drum_saturator.render(drums);
        self.drum_tone.render(drums, ctx.sample_rate);

        let vinyl = &mut self.vinyl_buf[..frames];
        self.vinyl.render_block(vinyl, ctx);

        for i in 0..frames {
            let strings = (voice[i] + voice_send[i]) * STRINGS_LEVEL;
            let percussion = (drums[i] + vinyl[i]) * DRUM_MASTER_LEVEL;
            out[i] = strings + percussion;
        }
    }
}
