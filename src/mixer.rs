//! The mixer facade: the operation surface the presentation layer drives.
//!
//! All graph mutations happen under one lock, so `play`, `stop` and `dispose`
//! never interleave. The only slow step, buffer generation, runs outside that
//! lock. `play` takes a ticket for its sound before generating; a `stop` or a
//! newer `play` for the same sound invalidates the ticket, and a play whose
//! ticket went stale discards its voice instead of starting it.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    cache::BufferCache,
    config::MixerConfig,
    dsp::{clamp_level, percent_to_level},
    error::EngineError,
    graph::{GraphRenderer, VoiceGraph},
    io::{AudioHost, CpalHost, OutputDevice},
};

struct MixerState {
    graph: VoiceGraph,
    /// Waiting for the output device; handed over when it opens.
    renderer: Option<GraphRenderer>,
    output: Option<Box<dyn OutputDevice>>,
    /// Per-sound levels, live or pending for the next `play`.
    volumes: HashMap<String, f32>,
    tickets: HashMap<String, u64>,
    next_ticket: u64,
    disposed: bool,
}

impl MixerState {
    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.disposed {
            Err(EngineError::EngineDisposed)
        } else {
            Ok(())
        }
    }

    /// Open the output on first use and resume it if suspended. Returns the
    /// device sample rate.
    fn ensure_output(&mut self, host: &dyn AudioHost) -> Result<u32, EngineError> {
        if self.output.is_none() {
            let mut output = host.open_output()?;
            if let Some(renderer) = self.renderer.take() {
                output.attach(renderer);
            }
            info!(
                sample_rate = output.sample_rate(),
                channels = output.channels(),
                "audio output opened"
            );
            self.output = Some(output);
        }

        let Some(output) = self.output.as_mut() else {
            return Err(EngineError::AudioDeviceUnavailable("no output".into()));
        };
        if output.is_suspended() {
            output.resume()?;
        }
        Ok(output.sample_rate())
    }

    fn issue_ticket(&mut self, id: &str) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.tickets.insert(id.to_owned(), ticket);
        ticket
    }

    fn holds_ticket(&self, id: &str, ticket: u64) -> bool {
        self.tickets.get(id) == Some(&ticket)
    }

    /// Stop every voice and release the output. Returns voices stopped.
    fn teardown(&mut self) -> usize {
        let stopped = self.graph.teardown_all();
        if let Some(mut output) = self.output.take() {
            output.close();
        }
        self.renderer = None;
        self.volumes.clear();
        self.tickets.clear();
        self.disposed = true;
        stopped
    }
}

/// Plays any number of ambient sounds at once, one voice per sound.
///
/// # Example
///
/// ```no_run
/// use ambience::{AmbientMixer, MixerConfig};
///
/// let mixer = AmbientMixer::with_default_output(MixerConfig::default());
/// mixer.play("rain-forest")?;
/// mixer.set_volume_percent("rain-forest", 40.0)?;
/// mixer.play("fireplace")?;
/// mixer.dispose()?;
/// # Ok::<(), ambience::EngineError>(())
/// ```
pub struct AmbientMixer {
    host: Box<dyn AudioHost>,
    default_volume: f32,
    cache: BufferCache,
    state: Mutex<MixerState>,
}

impl AmbientMixer {
    pub fn new(host: impl AudioHost + 'static, config: MixerConfig) -> Self {
        let (graph, renderer) =
            VoiceGraph::new(config.master_volume, config.render_queue_capacity);

        Self {
            host: Box::new(host),
            default_volume: clamp_level(config.default_volume),
            cache: BufferCache::new(config.generator, config.seed),
            state: Mutex::new(MixerState {
                graph,
                renderer: Some(renderer),
                output: None,
                volumes: HashMap::new(),
                tickets: HashMap::new(),
                next_ticket: 0,
                disposed: false,
            }),
        }
    }

    /// A mixer on the system's default output device.
    pub fn with_default_output(config: MixerConfig) -> Self {
        Self::new(CpalHost, config)
    }

    /// Start looping `id` from the beginning, replacing any voice already
    /// playing it. Returns once the new voice is registered. If the voice
    /// cannot start, a voice already playing `id` is left alone.
    pub fn play(&self, id: &str) -> Result<(), EngineError> {
        let (sample_rate, ticket) = {
            let mut state = self.state.lock();
            state.ensure_live()?;
            let sample_rate = state.ensure_output(self.host.as_ref())?;
            (sample_rate, state.issue_ticket(id))
        };

        let buffer = self.cache.get(id, sample_rate);

        let mut state = self.state.lock();
        state.ensure_live()?;
        if !state.holds_ticket(id, ticket) {
            debug!(sound = id, ticket, "superseded before its buffer was ready");
            return Ok(());
        }

        let gain = state
            .volumes
            .get(id)
            .copied()
            .unwrap_or(self.default_volume);
        if let Some(output) = state.output.as_mut() {
            output.sync_graph();
        }
        if let Err(err) = state.graph.start(id, buffer, gain) {
            state.tickets.remove(id);
            return Err(err.into());
        }

        info!(sound = id, gain, "voice started");
        Ok(())
    }

    /// Stop `id`. Stopping a sound that is not playing is a no-op.
    pub fn stop(&self, id: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.ensure_live()?;
        state.tickets.remove(id);
        if state.graph.stop(id) {
            info!(sound = id, "voice stopped");
        }
        Ok(())
    }

    /// Set the level of `id` in `[0, 1]`, clamped. Applies live when the sound
    /// is playing and is remembered for its next `play` either way.
    pub fn set_volume(&self, id: &str, level: f32) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.ensure_live()?;
        let level = clamp_level(level);
        state.volumes.insert(id.to_owned(), level);
        state.graph.set_voice_gain(id, level);
        Ok(())
    }

    /// `set_volume` on the UI's 0–100 scale.
    pub fn set_volume_percent(&self, id: &str, percent: f32) -> Result<(), EngineError> {
        self.set_volume(id, percent_to_level(percent))
    }

    /// Set the master level in `[0, 1]`, clamped. Scales every voice.
    pub fn set_master_volume(&self, level: f32) -> Result<(), EngineError> {
        let state = self.state.lock();
        state.ensure_live()?;
        state.graph.set_master_gain(level);
        Ok(())
    }

    pub fn set_master_volume_percent(&self, percent: f32) -> Result<(), EngineError> {
        self.set_master_volume(percent_to_level(percent))
    }

    /// Pause the output device. Voices keep their place and the next `play`
    /// or `resume` picks up where they left off. No-op before the device opens.
    pub fn suspend(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.ensure_live()?;
        if let Some(output) = state.output.as_mut() {
            if !output.is_suspended() {
                output.suspend()?;
                debug!("audio output suspended");
            }
        }
        Ok(())
    }

    /// Open the output if needed and resume it.
    pub fn resume(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.ensure_live()?;
        state.ensure_output(self.host.as_ref())?;
        Ok(())
    }

    /// Whether the output is open and paused.
    pub fn is_suspended(&self) -> bool {
        self.state
            .lock()
            .output
            .as_ref()
            .is_some_and(|output| output.is_suspended())
    }

    /// Stop all voices, close the output and drop every cached buffer. The
    /// mixer is unusable afterwards.
    pub fn dispose(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.ensure_live()?;
        let stopped = state.teardown();
        self.cache.clear();
        info!(stopped, "mixer disposed");
        Ok(())
    }

    pub fn is_playing(&self, id: &str) -> bool {
        let state = self.state.lock();
        !state.disposed && state.graph.is_playing(id)
    }

    /// Level of `id`: the live gain, else the remembered level, else the default.
    pub fn current_volume(&self, id: &str) -> f32 {
        let state = self.state.lock();
        state
            .graph
            .voice_gain(id)
            .or_else(|| state.volumes.get(id).copied())
            .unwrap_or(self.default_volume)
    }

    pub fn master_volume(&self) -> f32 {
        self.state.lock().graph.master_gain()
    }

    /// Ids with a live voice, sorted.
    pub fn playing(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut ids: Vec<String> = state.graph.ids().map(str::to_owned).collect();
        ids.sort();
        ids
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Output sample rate, once the device has been opened.
    pub fn sample_rate(&self) -> Option<u32> {
        self.state
            .lock()
            .output
            .as_ref()
            .map(|output| output.sample_rate())
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }
}

impl Drop for AmbientMixer {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if !state.disposed {
            let stopped = state.teardown();
            if stopped > 0 {
                warn!(stopped, "mixer dropped without dispose; voices stopped");
            }
        }
    }
}
