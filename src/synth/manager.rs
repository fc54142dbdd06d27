use log::debug;

use crate::config::EngineConfig;
use crate::dsp::noise::NoiseTable;
use crate::graph::node::RenderCtx;
use crate::voices::strings::StringsVoice;
use crate::MAX_BLOCK_SIZE;

/*
Voice Allocation
================

The manager owns the id -> voice mapping exclusively. Callers identify
voices with whatever integer suits them (the creature uses limb indices);
the manager enforces three invariants:

  1. At most one allocated voice per id. A second `start` on a live id is a
     no-op, so the interaction layer can spam pointer events freely.

  2. At most `max_voices` allocated at once. When the ceiling is hit, the
     voice with the oldest creation timestamp is force-released with the
     short steal release, then the new voice is admitted. Admission always
     succeeds; there is no rejection path.

  3. `stop` on an unknown id is a no-op. Start/stop pairs can therefore
     never corrupt the map no matter how the caller miscounts them.

Releasing a voice removes it from the allocated set immediately (its id can
be reused at once) but keeps it rendering on a drain list until the release
ramp plus safety margin pass, at which point it is dropped and its nodes
freed. A tie on creation timestamps is broken by an admission sequence
number, so eviction order stays deterministic.
*/

struct ManagedVoice {
    id: u32,
    seq: u64,
    voice: StringsVoice,
}

pub struct VoiceManager {
    allocated: Vec<ManagedVoice>,
    draining: Vec<StringsVoice>,
    next_seq: u64,
    config: EngineConfig,
    noise: NoiseTable,
    scratch_main: Vec<f32>,
    scratch_send: Vec<f32>,
}

impl VoiceManager {
    pub fn new(config: EngineConfig, noise: NoiseTable) -> Self {
        Self {
            allocated: Vec::with_capacity(config.max_voices),
            draining: Vec::new(),
            next_seq: 0,
            config,
            noise,
            scratch_main: vec![0.0; MAX_BLOCK_SIZE],
            scratch_send: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Allocate a voice for `id` at time `now`. No-op when the id is already
    /// live; steals the oldest voice first when at the ceiling.
    pub fn start(&mut self, id: u32, frequencies: &[f32], now: f64) {
        if self.is_live(id) {
            return;
        }

        if self.allocated.len() >= self.config.max_voices {
            self.steal_oldest(now);
        }

        let voice = StringsVoice::new(frequencies, &self.noise, now, &self.config.voice);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.allocated.push(ManagedVoice { id, seq, voice });
    }

    /// Release the voice for `id` with the configured release; no-op when
    /// the id has no live voice.
    pub fn stop(&mut self, id: u32, now: f64) {
        let Some(index) = self.allocated.iter().position(|v| v.id == id) else {
            return;
        };
        let mut entry = self.allocated.swap_remove(index);
        entry.voice.stop(now, self.config.voice.release);
        self.draining.push(entry.voice);
    }

    /// Release every live voice. Used when the interaction surface goes
    /// away so nothing sounds forever.
    pub fn stop_all(&mut self, now: f64) {
        for mut entry in self.allocated.drain(..) {
            entry.voice.stop(now, self.config.voice.release);
            self.draining.push(entry.voice);
        }
    }

    fn steal_oldest(&mut self, now: f64) {
        let oldest = self
            .allocated
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.voice
                    .started_at()
                    .total_cmp(&b.voice.started_at())
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(index, _)| index);

        if let Some(index) = oldest {
            let mut entry = self.allocated.swap_remove(index);
            debug!(
                "voice ceiling reached, stealing id {} (started at {:.3}s)",
                entry.id,
                entry.voice.started_at()
            );
            entry.voice.stop(now, self.config.voice.steal_release);
            self.draining.push(entry.voice);
        }
    }

    pub fn is_live(&self, id: u32) -> bool {
        self.allocated.iter().any(|v| v.id == id)
    }

    /// Number of allocated (id-holding) voices.
    pub fn live_count(&self) -> usize {
        self.allocated.len()
    }

    /// Allocated plus still-draining voices; what the render pass pays for.
    pub fn sounding_count(&self) -> usize {
        self.allocated.len() + self.draining.len()
    }

    pub fn live_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.allocated.iter().map(|v| v.id)
    }

    /// Mix every voice into `main` and `send` (additively), then drop
    /// drained voices whose release has fully elapsed.
    pub fn render_block(&mut self, main: &mut [f32], send: &mut [f32], ctx: &RenderCtx) {
        let frames = main.len();
        let block_end = ctx.time_at(frames);

        for entry in self.allocated.iter_mut() {
            let scratch_main = &mut self.scratch_main[..frames];
            let scratch_send = &mut self.scratch_send[..frames];
            entry.voice.render_block(scratch_main, scratch_send, ctx);
            for i in 0..frames {
                main[i] += scratch_main[i];
                send[i] += scratch_send[i];
            }
        }

        for voice in self.draining.iter_mut() {
            let scratch_main = &mut self.scratch_main[..frames];
            let scratch_send = &mut self.scratch_send[..frames];
            voice.render_block(scratch_main, scratch_send, ctx);
            for i in 0..frames {
                main[i] += scratch_main[i];
                send[i] += scratch_send[i];
            }
        }

        self.draining.retain(|voice| !voice.is_finished(block_end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> VoiceManager {
        let config = EngineConfig {
            sample_rate: 8_000.0,
            ..EngineConfig::default()
        };
        let noise = NoiseTable::with_seed(config.sample_rate, 21);
        VoiceManager::new(config, noise)
    }

    const CHORD: [f32; 3] = [220.0, 261.63, 329.63];

    #[test]
    fn duplicate_start_is_a_noop() {
        let mut vm = manager();
        vm.start(3, &CHORD, 0.0);
        vm.start(3, &[440.0], 0.1);
        assert_eq!(vm.live_count(), 1);
        assert!(vm.is_live(3));
    }

    #[test]
    fn stop_on_absent_id_is_a_noop() {
        let mut vm = manager();
        vm.stop(99, 0.0);
        assert_eq!(vm.live_count(), 0);

        vm.start(1, &CHORD, 0.0);
        vm.stop(99, 0.1);
        assert_eq!(vm.live_count(), 1);
    }

    #[test]
    fn ceiling_is_enforced_and_oldest_is_stolen() {
        let mut vm = manager();
        for id in 0..8 {
            vm.start(id, &CHORD, id as f64 * 0.1);
        }
        assert_eq!(vm.live_count(), 8);

        vm.start(100, &CHORD, 1.0);
        assert_eq!(vm.live_count(), 8, "ceiling must hold");
        assert!(!vm.is_live(0), "oldest voice should have been evicted");
        assert!(vm.is_live(100), "admission must always succeed");
    }

    #[test]
    fn steal_order_follows_creation_time_not_id() {
        let mut vm = manager();
        // Start in reverse id order so age and id disagree.
        for (age, id) in (0..8).rev().enumerate() {
            vm.start(id, &CHORD, age as f64 * 0.1);
        }
        vm.start(100, &CHORD, 2.0);
        assert!(!vm.is_live(7), "id 7 was created first and should go");
        assert!(vm.is_live(0));
    }

    #[test]
    fn equal_timestamps_break_ties_by_admission_order() {
        let mut vm = manager();
        for id in 0..8 {
            vm.start(id, &CHORD, 0.0);
        }
        vm.start(100, &CHORD, 0.0);
        assert!(!vm.is_live(0), "first-admitted voice is the tie loser");
    }

    #[test]
    fn stopped_id_is_immediately_reusable() {
        let mut vm = manager();
        vm.start(3, &CHORD, 0.0);
        vm.stop(3, 0.5);
        assert!(!vm.is_live(3));
        assert_eq!(vm.sounding_count(), 1, "release tail keeps sounding");

        vm.start(3, &[440.0], 0.6);
        assert!(vm.is_live(3));
        assert_eq!(vm.live_count(), 1);
    }

    #[test]
    fn stop_all_releases_everything() {
        let mut vm = manager();
        for id in 0..5 {
            vm.start(id, &CHORD, id as f64 * 0.01);
        }
        vm.stop_all(1.0);
        assert_eq!(vm.live_count(), 0);
        assert_eq!(vm.sounding_count(), 5);
    }

    #[test]
    fn drained_voices_are_freed_after_release() {
        let mut vm = manager();
        let release = vm.config.voice.release;
        let margin = vm.config.voice.cleanup_margin;
        vm.start(1, &CHORD, 0.0);
        vm.stop(1, 0.2);

        // Render past the end of the release ramp plus margin.
        let frames = 256;
        let mut main = vec![0.0f32; frames];
        let mut send = vec![0.0f32; frames];
        let after = 0.2 + release + margin + 0.01;
        vm.render_block(&mut main, &mut send, &RenderCtx::new(8_000.0, after));
        assert_eq!(vm.sounding_count(), 0, "release tail should be reclaimed");
    }

    #[test]
    fn render_mixes_voices_additively() {
        let mut vm = manager();
        vm.start(1, &[220.0], 0.0);

        let frames = 1024;
        let mut one_main = vec![0.0f32; frames];
        let mut one_send = vec![0.0f32; frames];
        vm.render_block(&mut one_main, &mut one_send, &RenderCtx::new(8_000.0, 0.2));

        let peak = one_main.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(peak > 0.0, "live voice should produce signal");
        let send_peak = one_send.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(send_peak > 0.0 && send_peak < peak, "send is an attenuated copy");
    }
}
