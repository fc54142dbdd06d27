use log::debug;

use crate::config::EngineConfig;
use crate::sequencing::pattern::{StepPattern, STEPS_PER_BAR};

/*
Lookahead Beat Scheduling
=========================

The scheduler never fires a drum "now". It keeps a virtual timeline cursor
(`next_time`, in render-clock seconds) slightly ahead of the audible
present, and on every pass emits all the hits whose step falls inside a
small window:

    render clock ----|================|------------------> time
                    now          now + lookahead
                          ^ cursor walks this span,
                            one step at a time

Each emitted hit carries an absolute timestamp; the synthesis side renders
it sample-accurately whenever its moment arrives. The pass itself can run
early, late, or jittered by many milliseconds and nothing audible changes,
because the timestamps were computed in timeline space, not wall time. That
is the whole trick: the host's timer only has to be roughly periodic, the
window absorbs its jitter.

Two details of the musical surface:

  swing    Every step with `step % 4 == 2` (the "and" of each beat) is
           pushed late by `(swing - 0.5) * step * 2`. Swing itself is
           derived from tempo: 0.55 at 70 BPM rising linearly to 0.60 at
           130 BPM, so faster grooves lean harder.

  density  Above 112 BPM the hat tier rises to 2 and the extra off-beat
           hats (steps 3, 9, 15) join the pattern.

The cursor only ever advances, and a pass holds `&mut self`, so exactly one
catch-up can be in flight; both invariants come for free from the shape of
the code.

Tempo changes take effect on the next pass. Hits already emitted keep the
timestamps they were given; nothing is ever rescheduled retroactively.
*/

const STEPS_PER_BEAT: f64 = 4.0;
const SWING_BASE: f32 = 0.55;
const SWING_SPAN: f32 = 0.05;
const DENSE_HAT_THRESHOLD_BPM: u32 = 112;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumKind {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
}

/// One scheduled hit: what to play and the absolute time to play it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumHit {
    pub kind: DrumKind,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stopped,
    Running,
}

pub struct BeatScheduler {
    state: State,
    bpm: u32,
    swing: f32,
    hat_density: u8,
    next_time: f64,
    pattern: StepPattern,
    min_bpm: u32,
    max_bpm: u32,
    lookahead: f64,
    lead_in: f64,
}

impl BeatScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        let mut scheduler = Self {
            state: State::Stopped,
            bpm: config.default_bpm,
            swing: SWING_BASE,
            hat_density: 1,
            next_time: 0.0,
            pattern: StepPattern::DEFAULT,
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
            lookahead: config.lookahead,
            lead_in: config.lead_in,
        };
        scheduler.set_tempo(config.default_bpm);
        scheduler
    }

    /// Begin scheduling, with the first step a short lead-in after `now`.
    /// No-op while already running, so there can never be duplicate
    /// timelines.
    pub fn start(&mut self, now: f64) {
        if self.state == State::Running {
            return;
        }
        self.next_time = now + self.lead_in;
        self.state = State::Running;
        debug!("beat started at {now:.3}s, {} bpm", self.bpm);
    }

    /// Halt scheduling. Idempotent. Hits already emitted still play out.
    pub fn stop(&mut self) {
        if self.state == State::Running {
            debug!("beat stopped");
        }
        self.state = State::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Clamp into the supported range and derive the tempo-dependent feel
    /// parameters. Effective from the next scheduling pass.
    pub fn set_tempo(&mut self, bpm: u32) {
        let clamped = bpm.clamp(self.min_bpm, self.max_bpm);
        if clamped != bpm {
            debug!("tempo {bpm} outside [{}, {}], clamped to {clamped}", self.min_bpm, self.max_bpm);
        }
        self.bpm = clamped;

        let ratio = (clamped - self.min_bpm) as f32 / (self.max_bpm - self.min_bpm) as f32;
        self.swing = SWING_BASE + ratio * SWING_SPAN;
        self.hat_density = if clamped > DENSE_HAT_THRESHOLD_BPM { 2 } else { 1 };
    }

    pub fn tempo(&self) -> u32 {
        self.bpm
    }

    pub fn swing(&self) -> f32 {
        self.swing
    }

    pub fn hat_density(&self) -> u8 {
        self.hat_density
    }

    /// Seconds per sixteenth-note step at the current tempo.
    pub fn step_duration(&self) -> f64 {
        60.0 / self.bpm as f64 / STEPS_PER_BEAT
    }

    /// Emit every hit whose step falls before `now + lookahead`, advancing
    /// the cursor one step at a time. Call periodically; the interval only
    /// needs to stay under the lookahead window.
    pub fn scheduling_pass(&mut self, now: f64, emit: &mut dyn FnMut(DrumHit)) {
        if self.state != State::Running {
            return;
        }

        let step_duration = self.step_duration();
        let swing_offset = (self.swing as f64 - 0.5) * step_duration * 2.0;

        while self.next_time < now + self.lookahead {
            let step = (self.next_time / step_duration).floor() as usize % STEPS_PER_BAR;
            let is_swing_step = step % 4 == 2;
            let time = if is_swing_step {
                self.next_time + swing_offset
            } else {
                self.next_time
            };

            if self.pattern.kick_on(step) {
                emit(DrumHit { kind: DrumKind::Kick, time });
            }
            if self.pattern.snare_on(step) {
                emit(DrumHit { kind: DrumKind::Snare, time });
            }
            if self.pattern.open_hat_on(step) {
                emit(DrumHit { kind: DrumKind::OpenHat, time });
            }
            if self.pattern.closed_hat_on(step) {
                emit(DrumHit { kind: DrumKind::ClosedHat, time });
            }
            if self.hat_density > 1 && self.pattern.extra_hat_on(step) {
                emit(DrumHit { kind: DrumKind::ClosedHat, time });
            }

            self.next_time += step_duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> BeatScheduler {
        BeatScheduler::new(&EngineConfig::default())
    }

    /// Run 25 ms passes until the first bar has been fully scheduled, then
    /// drop anything belonging to the second bar. Swing never reaches half
    /// a step, so the boundary is unambiguous.
    fn collect_one_bar(s: &mut BeatScheduler, lead_in: f64) -> Vec<DrumHit> {
        let step = s.step_duration();
        let bar_end = lead_in + step * STEPS_PER_BAR as f64;
        let mut hits = Vec::new();
        let mut now = 0.0;
        while now < bar_end + 0.2 {
            s.scheduling_pass(now, &mut |hit| hits.push(hit));
            now += 0.025;
        }
        hits.retain(|h| h.time < bar_end - step * 0.4);
        hits
    }

    fn step_of(hit: &DrumHit, s: &BeatScheduler, lead_in: f64) -> usize {
        // Swing shifts a hit by well under half a step, so rounding recovers
        // the step index.
        ((hit.time - lead_in) / s.step_duration()).round() as usize % STEPS_PER_BAR
    }

    #[test]
    fn tempo_clamps_to_supported_range() {
        let mut s = scheduler();
        s.set_tempo(200);
        assert_eq!(s.tempo(), 130);
        s.set_tempo(10);
        assert_eq!(s.tempo(), 70);
        s.set_tempo(92);
        assert_eq!(s.tempo(), 92);
    }

    #[test]
    fn swing_grows_with_tempo() {
        let mut s = scheduler();
        s.set_tempo(70);
        let slow = s.swing();
        s.set_tempo(130);
        let fast = s.swing();
        assert!((slow - 0.55).abs() < 1e-6);
        assert!((fast - 0.60).abs() < 1e-6);
        assert!(fast > slow);
    }

    #[test]
    fn density_tier_rises_above_threshold() {
        let mut s = scheduler();
        s.set_tempo(112);
        assert_eq!(s.hat_density(), 1);
        s.set_tempo(113);
        assert_eq!(s.hat_density(), 2);
        s.set_tempo(120);
        assert_eq!(s.hat_density(), 2);
    }

    #[test]
    fn start_is_idempotent() {
        let mut s = scheduler();
        s.start(0.0);
        let cursor_after_first = s.next_time;
        s.start(5.0);
        assert_eq!(s.next_time, cursor_after_first, "second start must not reseed");
        assert!(s.is_running());
    }

    #[test]
    fn stop_is_idempotent_and_halts_emission() {
        let mut s = scheduler();
        s.stop();
        s.start(0.0);
        s.stop();
        s.stop();

        let mut count = 0;
        s.scheduling_pass(0.0, &mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn step_duration_at_92_bpm() {
        let mut s = scheduler();
        s.set_tempo(92);
        let expected = 60.0 / 92.0 / 4.0;
        assert!((s.step_duration() - expected).abs() < 1e-12);
        assert!((s.step_duration() - 0.1630).abs() < 1e-3);
    }

    #[test]
    fn kicks_and_snares_land_on_pattern_steps() {
        let mut s = scheduler();
        s.set_tempo(92);
        s.start(0.0);
        let lead_in = EngineConfig::default().lead_in;

        let hits = collect_one_bar(&mut s, lead_in);

        let kick_steps: Vec<usize> = hits
            .iter()
            .filter(|h| h.kind == DrumKind::Kick)
            .map(|h| step_of(h, &s, lead_in))
            .collect();
        let snare_steps: Vec<usize> = hits
            .iter()
            .filter(|h| h.kind == DrumKind::Snare)
            .map(|h| step_of(h, &s, lead_in))
            .collect();

        assert_eq!(kick_steps, vec![0, 7, 10, 14]);
        assert_eq!(snare_steps, vec![4, 12]);
    }

    #[test]
    fn dense_tier_adds_extra_hats() {
        let lead_in = EngineConfig::default().lead_in;

        let mut sparse = scheduler();
        sparse.set_tempo(92);
        sparse.start(0.0);
        let sparse_hits = collect_one_bar(&mut sparse, lead_in);
        let sparse_hat_steps: Vec<usize> = sparse_hits
            .iter()
            .filter(|h| h.kind == DrumKind::ClosedHat)
            .map(|h| step_of(h, &sparse, lead_in))
            .collect();
        assert!(!sparse_hat_steps.contains(&3));

        let mut dense = scheduler();
        dense.set_tempo(120);
        dense.start(0.0);
        let dense_hits = collect_one_bar(&mut dense, lead_in);
        let dense_hat_steps: Vec<usize> = dense_hits
            .iter()
            .filter(|h| h.kind == DrumKind::ClosedHat)
            .map(|h| step_of(h, &dense, lead_in))
            .collect();

        for extra in [3, 9, 15] {
            assert!(
                dense_hat_steps.contains(&extra),
                "step {extra} should carry a hat at density 2"
            );
        }
    }

    #[test]
    fn swing_delays_the_offbeat_steps() {
        let mut s = scheduler();
        s.set_tempo(92);
        s.start(0.0);
        let lead_in = EngineConfig::default().lead_in;
        let step = s.step_duration();
        let swing_offset = (s.swing() as f64 - 0.5) * step * 2.0;

        let hits = collect_one_bar(&mut s, lead_in);

        // Step 10 is a kick on a swing step; step 0 is straight.
        let straight_kick = hits
            .iter()
            .find(|h| h.kind == DrumKind::Kick && step_of(h, &s, lead_in) == 0)
            .unwrap();
        let swung_kick = hits
            .iter()
            .find(|h| h.kind == DrumKind::Kick && step_of(h, &s, lead_in) == 10)
            .unwrap();

        assert!((straight_kick.time - lead_in).abs() < 1e-9);
        let expected = lead_in + 10.0 * step + swing_offset;
        assert!(
            (swung_kick.time - expected).abs() < 1e-9,
            "swing offset should push step 10 late"
        );
    }

    #[test]
    fn cursor_never_regresses_and_events_stay_in_window() {
        let mut s = scheduler();
        s.start(0.0);
        let lookahead = EngineConfig::default().lookahead;
        let step = s.step_duration();

        let mut now = 0.0;
        let mut previous_cursor = s.next_time;
        for _ in 0..100 {
            let mut emitted: Vec<DrumHit> = Vec::new();
            s.scheduling_pass(now, &mut |hit| emitted.push(hit));

            assert!(s.next_time >= previous_cursor, "cursor must not move backward");
            previous_cursor = s.next_time;

            for hit in &emitted {
                // Hits land inside the window, give or take one swing offset.
                assert!(hit.time >= now - 1e-9);
                assert!(hit.time < now + lookahead + step);
            }
            now += 0.025;
        }
    }

    #[test]
    fn tempo_change_applies_to_the_next_pass_only() {
        let mut s = scheduler();
        s.set_tempo(92);
        s.start(0.0);

        let mut first: Vec<DrumHit> = Vec::new();
        s.scheduling_pass(0.0, &mut |hit| first.push(hit));
        let cursor_after_first = s.next_time;

        s.set_tempo(130);
        // The cursor position is untouched by the tempo change.
        assert_eq!(s.next_time, cursor_after_first);
        // New passes advance with the new step duration.
        assert!((s.step_duration() - 60.0 / 130.0 / 4.0).abs() < 1e-12);
    }
}
