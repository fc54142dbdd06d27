use crate::MIN_LEVEL;

/*
Timestamped Parameter Automation
================================

A `Param` is an automatable node parameter: a current value plus a sorted
list of future-dated events. Control code mutates the event list; the render
pass asks for the value at each sample's timestamp. Because every event
carries an absolute time, control-side jitter never reaches the audio: a
gain scheduled to peak at t=1.020s peaks at exactly that sample no matter
when the scheduling call ran.

Vocabulary
----------

  anchor      The (time, value) pair of the most recently passed event.
              Ramps interpolate from the anchor to their own endpoint.

  Set         Jump to a value at a time. Before that time the previous
              value holds.

  ExpRamp     Exponential glide from the anchor to (value, end_time).
              Exponential curves sound natural for gain and pitch but are
              undefined through zero, so endpoints clamp to MIN_LEVEL.

Cancellation
------------

`hold_at(t)` implements click-free release: it evaluates the lane at `t`,
discards every scheduled event, and re-anchors at the captured value. A
release ramp scheduled right after starts from the level the listener is
actually hearing, never from a stale automation target.

Evaluation is monotonic: `step_to` consumes passed events with a cursor so
per-sample evaluation stays O(1) amortized regardless of history length.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
enum EventKind {
    Set(f32),
    ExpRamp(f32),
}

#[derive(Debug, Clone, Copy)]
struct ParamEvent {
    time: f64,
    kind: EventKind,
}

pub struct Param {
    events: Vec<ParamEvent>,
    /// Index of the first event `step_to` has not consumed yet.
    cursor: usize,
    anchor_value: f32,
    anchor_time: f64,
}

impl Param {
    pub fn new(initial: f32) -> Self {
        Self {
            events: Vec::new(),
            cursor: 0,
            anchor_value: initial,
            anchor_time: f64::NEG_INFINITY,
        }
    }

    /// Schedule a jump to `value` at `time`.
    pub fn set_value_at(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent {
            time,
            kind: EventKind::Set(value),
        });
    }

    /// Schedule an exponential glide ending at (`value`, `end_time`),
    /// starting from whatever event precedes it.
    pub fn exp_ramp_to(&mut self, value: f32, end_time: f64) {
        self.insert(ParamEvent {
            time: end_time,
            kind: EventKind::ExpRamp(value.max(MIN_LEVEL)),
        });
    }

    /// Drop every scheduled event at or after `time`.
    pub fn cancel_scheduled(&mut self, time: f64) {
        let keep = self.events[self.cursor..].partition_point(|e| e.time < time);
        self.events.truncate(self.cursor + keep);
    }

    /// Capture the instantaneous value at `time`, discard all automation,
    /// and re-anchor there. The next ramp starts from the captured value.
    pub fn hold_at(&mut self, time: f64) {
        let value = self.value_at(time);
        self.events.clear();
        self.cursor = 0;
        self.anchor_value = value.max(MIN_LEVEL);
        self.anchor_time = time;
    }

    /// Evaluate the lane at `time` without consuming events.
    pub fn value_at(&self, time: f64) -> f32 {
        let mut anchor_value = self.anchor_value;
        let mut anchor_time = self.anchor_time;

        for event in &self.events[self.cursor..] {
            if event.time <= time {
                anchor_value = event.target();
                anchor_time = event.time;
                continue;
            }
            if let EventKind::ExpRamp(target) = event.kind {
                return exp_interp(anchor_time, anchor_value, event.time, target, time);
            }
            break; // A pending Set holds the previous value until its time.
        }

        anchor_value
    }

    /// Evaluate at `time` and consume every event it has passed. `time` must
    /// be monotonically non-decreasing across calls.
    pub fn step_to(&mut self, time: f64) -> f32 {
        while let Some(event) = self.events.get(self.cursor) {
            if event.time > time {
                break;
            }
            self.anchor_value = event.target();
            self.anchor_time = event.time;
            self.cursor += 1;
        }

        if let Some(event) = self.events.get(self.cursor) {
            if let EventKind::ExpRamp(target) = event.kind {
                return exp_interp(self.anchor_time, self.anchor_value, event.time, target, time);
            }
        }

        self.anchor_value
    }

    /// The value at the last consumed event.
    pub fn current(&self) -> f32 {
        self.anchor_value
    }

    /// True when no scheduled events remain to be consumed.
    pub fn is_settled(&self) -> bool {
        self.cursor >= self.events.len()
    }

    fn insert(&mut self, event: ParamEvent) {
        let offset = self.events[self.cursor..].partition_point(|e| e.time <= event.time);
        self.events.insert(self.cursor + offset, event);
    }
}

impl ParamEvent {
    fn target(&self) -> f32 {
        match self.kind {
            EventKind::Set(v) => v,
            EventKind::ExpRamp(v) => v,
        }
    }
}

fn exp_interp(t0: f64, v0: f32, t1: f64, v1: f32, t: f64) -> f32 {
    if !t0.is_finite() || t1 <= t0 {
        return v1;
    }
    if t <= t0 {
        return v0;
    }
    let from = v0.max(MIN_LEVEL);
    let to = v1.max(MIN_LEVEL);
    let progress = ((t - t0) / (t1 - t0)) as f32;
    from * (to / from).powf(progress)
}
