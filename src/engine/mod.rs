//! The engine context: owns every shared resource (noise table, effects
//! bus, voice map, beat state) and exposes the whole control surface.
//!
//! There are no process-wide globals; a host builds an [`AudioEngine`],
//! drives `render_block` from its audio callback, and either calls the
//! control methods directly (single-threaded hosts, tests) or through an
//! [`EngineHandle`] over the message ring (threaded hosts).

pub mod bus;
#[cfg(feature = "rtrb")]
pub mod handle;

#[cfg(feature = "rtrb")]
pub use handle::EngineHandle;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, RingBuffer};

use crate::config::EngineConfig;
use crate::dsp::noise::NoiseTable;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::sequencing::scheduler::{BeatScheduler, DrumHit, DrumKind};
use crate::synth::manager::VoiceManager;
use crate::synth::message::EngineMessage;
use crate::voices::hihat::HatVoice;
use crate::voices::kick::KickVoice;
use crate::voices::snare::SnareVoice;
use crate::MAX_BLOCK_SIZE;

use self::bus::EffectsBus;

/// Capacity of the control message ring. Control traffic is human-scale
/// (touches and tempo knobs), so this is generous.
#[cfg(feature = "rtrb")]
const CONTROL_RING_CAPACITY: usize = 256;

pub struct AudioEngine {
    config: EngineConfig,
    noise: NoiseTable,
    voices: VoiceManager,
    beat: BeatScheduler,
    /// Live drum one-shots; fire-and-forget, culled once inactive.
    hits: Vec<Box<dyn GraphNode>>,
    bus: EffectsBus,
    #[cfg(feature = "rtrb")]
    rx: Option<Consumer<EngineMessage>>,
    /// Render clock in seconds: samples rendered so far / sample rate.
    /// The reference for every future-dated timestamp in the engine.
    clock: f64,
    suspended: bool,
    buf_voice: Vec<f32>,
    buf_send: Vec<f32>,
    buf_drum: Vec<f32>,
    buf_hit: Vec<f32>,
}

impl AudioEngine {
    pub fn new(config: EngineConfig) -> Self {
        let noise = NoiseTable::new(config.sample_rate);
        Self {
            voices: VoiceManager::new(config, noise.clone()),
            beat: BeatScheduler::new(&config),
            hits: Vec::new(),
            bus: EffectsBus::new(config.sample_rate, &noise),
            #[cfg(feature = "rtrb")]
            rx: None,
            clock: 0.0,
            suspended: false,
            buf_voice: vec![0.0; MAX_BLOCK_SIZE],
            buf_send: vec![0.0; MAX_BLOCK_SIZE],
            buf_drum: vec![0.0; MAX_BLOCK_SIZE],
            buf_hit: vec![0.0; MAX_BLOCK_SIZE],
            noise,
            config,
        }
    }

    /// Build an engine plus the control handle for driving it from another
    /// thread.
    #[cfg(feature = "rtrb")]
    pub fn with_control_channel(config: EngineConfig) -> (Self, EngineHandle) {
        let (tx, rx) = RingBuffer::<EngineMessage>::new(CONTROL_RING_CAPACITY);
        let mut engine = Self::new(config);
        engine.rx = Some(rx);
        (engine, EngineHandle::new(tx))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current render-clock time in seconds.
    pub fn current_time(&self) -> f64 {
        self.clock
    }

    // --- control surface -------------------------------------------------
    //
    // Callable directly when the caller shares a thread with rendering;
    // otherwise reached through EngineHandle and applied at block start.

    pub fn start_voice(&mut self, id: u32, frequencies: &[f32]) {
        self.voices.start(id, frequencies, self.clock);
    }

    pub fn stop_voice(&mut self, id: u32) {
        self.voices.stop(id, self.clock);
    }

    pub fn stop_all_voices(&mut self) {
        self.voices.stop_all(self.clock);
    }

    pub fn start_beat(&mut self) {
        self.beat.start(self.clock);
        self.bus.set_vinyl_running(true);
    }

    pub fn stop_beat(&mut self) {
        self.beat.stop();
        self.bus.set_vinyl_running(false);
    }

    pub fn set_beat_tempo(&mut self, bpm: u32) {
        self.beat.set_tempo(bpm);
    }

    /// Idempotent device-wake. A suspended engine renders silence and holds
    /// its clock still.
    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn beat(&self) -> &BeatScheduler {
        &self.beat
    }

    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    /// Live drum one-shots (diagnostics).
    pub fn active_hit_count(&self) -> usize {
        self.hits.len()
    }

    // --- render surface ---------------------------------------------------

    /// Render the next block of mono samples into `out`, advancing the
    /// render clock. Blocks larger than [`MAX_BLOCK_SIZE`] are processed in
    /// chunks.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        self.drain_control_messages();

        if self.suspended {
            out.fill(0.0);
            return;
        }

        let frames = out.len();
        let ctx = RenderCtx::new(self.config.sample_rate, self.clock);

        // One scheduling pass per block. Blocks are far shorter than the
        // lookahead window, so the cursor always stays ahead of the clock.
        let noise = &self.noise;
        let hits = &mut self.hits;
        self.beat.scheduling_pass(self.clock, &mut |hit| {
            hits.push(spawn_hit(hit, noise));
        });

        let buf_voice = &mut self.buf_voice[..frames];
        let buf_send = &mut self.buf_send[..frames];
        let buf_drum = &mut self.buf_drum[..frames];
        buf_voice.fill(0.0);
        buf_send.fill(0.0);
        buf_drum.fill(0.0);

        self.voices.render_block(buf_voice, buf_send, &ctx);

        for hit in self.hits.iter_mut() {
            let buf_hit = &mut self.buf_hit[..frames];
            hit.render_block(buf_hit, &ctx);
            for i in 0..frames {
                buf_drum[i] += buf_hit[i];
            }
        }
        self.hits.retain(|hit| hit.is_active());

        self.bus.render_block(buf_voice, buf_send, buf_drum, out, &ctx);

        self.clock += frames as f64 / self.config.sample_rate as f64;
    }

    fn drain_control_messages(&mut self) {
        #[cfg(feature = "rtrb")]
        loop {
            let message = match self.rx.as_mut() {
                Some(rx) => match rx.pop() {
                    Ok(message) => message,
                    Err(_) => break,
                },
                None => break,
            };
            self.apply(message);
        }
    }

    #[cfg_attr(not(feature = "rtrb"), allow(dead_code))]
    fn apply(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::StartVoice { id, pitches } => self.start_voice(id, pitches.as_slice()),
            EngineMessage::StopVoice { id } => self.stop_voice(id),
            EngineMessage::StopAllVoices => self.stop_all_voices(),
            EngineMessage::StartBeat => self.start_beat(),
            EngineMessage::StopBeat => self.stop_beat(),
            EngineMessage::SetTempo { bpm } => self.set_beat_tempo(bpm),
            EngineMessage::Resume => self.resume(),
        }
    }
}

fn spawn_hit(hit: DrumHit, noise: &NoiseTable) -> Box<dyn GraphNode> {
    match hit.kind {
        DrumKind::Kick => Box::new(KickVoice::new(hit.time)),
        DrumKind::Snare => Box::new(SnareVoice::new(hit.time, noise)),
        DrumKind::ClosedHat => Box::new(HatVoice::closed(hit.time, noise)),
        DrumKind::OpenHat => Box::new(HatVoice::open(hit.time, noise)),
    }
}
