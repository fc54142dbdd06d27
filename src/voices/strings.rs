use crate::config::VoiceEnvelope;
use crate::dsp::filter::SVFilter;
use crate::dsp::noise::{NoiseLoop, NoiseTable};
use crate::dsp::oscillator::{detune, OscillatorBlock};
use crate::dsp::waveshaper::Saturator;
use crate::graph::node::RenderCtx;
use crate::graph::param::Param;
use crate::MIN_LEVEL;

/*
Sustained Limb Voice
====================

Each touched limb holds one of these for as long as the touch lasts. The
patch is a small string-section imitation:

  per pitch:  saw (-4 cents) --+
              saw (+4 cents) --+
  once:       triangle sub at half the lowest pitch (-2 cents)
              noise -> band-pass 1.8 kHz (breath/bow texture)
                                 |
                        low-pass, cutoff swept 900 -> 2200 -> 1300 Hz
                                 |
                            saturation (drive 0.12)
                                 |
                          gain (ADSR automation)
                                 |
               +-> dry bus send  +-> reverb send (0.18)

The detuned saw pairs beat against each other a few times a second, which is
where the "section" impression comes from. The filter sweep opens the tone
during the attack and settles darker for the sustain.

All time-varying behaviour is expressed as automation on three lanes (gain,
noise gain, filter cutoff) anchored at the construction timestamp, so the
control thread never touches a live voice after building it; `stop` only
appends a release ramp.
*/

const DETUNE_CENTS: f32 = 4.0;
const SUB_DETUNE_CENTS: f32 = -2.0;
const NOISE_BAND_HZ: f32 = 1_800.0;
const NOISE_BAND_Q: f32 = 0.9;
const NOISE_PEAK: f32 = 0.05;
const NOISE_SUSTAIN: f32 = 0.02;
const FILTER_Q: f32 = 0.7;
const CUTOFF_START_HZ: f32 = 900.0;
const CUTOFF_PEAK_HZ: f32 = 2_200.0;
const CUTOFF_SETTLE_HZ: f32 = 1_300.0;
const CUTOFF_SETTLE_SECONDS: f64 = 0.35;
const SATURATION_DRIVE: f32 = 0.12;
const REVERB_SEND: f32 = 0.18;

struct VoiceOsc {
    osc: OscillatorBlock,
    frequency: f32,
}

pub struct StringsVoice {
    oscs: Vec<VoiceOsc>,
    noise: NoiseLoop,
    noise_filter: SVFilter,
    noise_gain: Param,
    filter: SVFilter,
    cutoff: Param,
    saturator: Saturator,
    gain: Param,
    started_at: f64,
    ends_at: Option<f64>,
    cleanup_margin: f64,
}

impl StringsVoice {
    /// Build a voice for the given fundamentals, anchored at `now`.
    ///
    /// An empty pitch set yields a voice that renders only its noise layer;
    /// callers are expected to pass at least one frequency.
    pub fn new(frequencies: &[f32], noise: &NoiseTable, now: f64, env: &VoiceEnvelope) -> Self {
        let mut oscs = Vec::with_capacity(frequencies.len() * 2 + 1);
        for &frequency in frequencies {
            oscs.push(VoiceOsc {
                osc: OscillatorBlock::sawtooth(),
                frequency: detune(frequency, -DETUNE_CENTS),
            });
            oscs.push(VoiceOsc {
                osc: OscillatorBlock::sawtooth(),
                frequency: detune(frequency, DETUNE_CENTS),
            });
        }
        if let Some(&first) = frequencies.first() {
            oscs.push(VoiceOsc {
                osc: OscillatorBlock::triangle(),
                frequency: detune(first / 2.0, SUB_DETUNE_CENTS),
            });
        }

        let attack_end = now + env.attack;
        let decay_end = attack_end + env.decay;

        let mut gain = Param::new(MIN_LEVEL);
        gain.set_value_at(MIN_LEVEL, now);
        gain.exp_ramp_to(env.peak, attack_end);
        gain.exp_ramp_to(env.sustain, decay_end);

        let mut noise_gain = Param::new(MIN_LEVEL);
        noise_gain.set_value_at(MIN_LEVEL, now);
        noise_gain.exp_ramp_to(NOISE_PEAK, attack_end);
        noise_gain.exp_ramp_to(NOISE_SUSTAIN, decay_end);

        let mut cutoff = Param::new(CUTOFF_START_HZ);
        cutoff.set_value_at(CUTOFF_START_HZ, now);
        cutoff.exp_ramp_to(CUTOFF_PEAK_HZ, attack_end);
        cutoff.exp_ramp_to(CUTOFF_SETTLE_HZ, now + env.attack + CUTOFF_SETTLE_SECONDS);

        // Start each voice's noise read at a different spot so concurrent
        // voices do not share breath texture.
        let offset = (now * 12_347.0) as usize;

        Self {
            oscs,
            noise: NoiseLoop::with_offset(noise.clone(), offset),
            noise_filter: SVFilter::bandpass(NOISE_BAND_HZ, NOISE_BAND_Q),
            noise_gain,
            filter: SVFilter::lowpass(CUTOFF_START_HZ, FILTER_Q),
            cutoff,
            saturator: Saturator::new(SATURATION_DRIVE),
            gain,
            started_at: now,
            ends_at: None,
            cleanup_margin: env.cleanup_margin,
        }
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Begin the release stage: capture the current gain levels so the ramp
    /// starts exactly where the voice is, then glide to silence over
    /// `release` seconds. The voice reports finished a safety margin later.
    ///
    /// Calling `stop` on a voice already releasing keeps the earlier ramp.
    pub fn stop(&mut self, now: f64, release: f64) {
        if self.ends_at.is_some() {
            return;
        }
        let end = now + release;

        self.gain.hold_at(now);
        self.gain.exp_ramp_to(MIN_LEVEL, end);
        self.noise_gain.hold_at(now);
        self.noise_gain.exp_ramp_to(MIN_LEVEL, end);

        self.ends_at = Some(end + self.cleanup_margin);
    }

    pub fn is_releasing(&self) -> bool {
        self.ends_at.is_some()
    }

    /// True once the release ramp plus its safety margin have elapsed; the
    /// owner drops the voice, freeing every node it holds.
    pub fn is_finished(&self, now: f64) -> bool {
        self.ends_at.is_some_and(|end| now >= end)
    }

    /// Current gain level, mainly useful to observers and tests.
    pub fn level(&self) -> f32 {
        self.gain.current()
    }

    /// Render one block, overwriting `main` (dry bus send) and `send`
    /// (reverb send). Both slices must be the same length.
    pub fn render_block(&mut self, main: &mut [f32], send: &mut [f32], ctx: &RenderCtx) {
        debug_assert_eq!(main.len(), send.len());
        let sample_rate = ctx.sample_rate;

        for (i, (dry, wet)) in main.iter_mut().zip(send.iter_mut()).enumerate() {
            let t = ctx.time_at(i);

            self.filter.set_cutoff(self.cutoff.step_to(t));
            let gain = self.gain.step_to(t);
            let noise_gain = self.noise_gain.step_to(t);

            let mut sum = 0.0;
            for voice_osc in &mut self.oscs {
                sum += voice_osc.osc.next_sample(voice_osc.frequency, sample_rate);
            }
            let breath = self.noise_filter.next_sample(self.noise.next_sample(), sample_rate);
            sum += breath * noise_gain;

            let shaped = self.saturator.shape(self.filter.next_sample(sum, sample_rate));
            let out = shaped * gain;

            *dry = out;
            *wet = out * REVERB_SEND;
        }
    }
}
