use std::{collections::HashMap, sync::Arc};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{trace, warn};

use crate::{
    buffer::AudioBuffer,
    dsp::{clamp_level, AtomicGain},
    error::GraphError,
    graph::{
        renderer::GraphRenderer,
        voice::{NodeId, PlaybackNode, Voice},
    },
    MAX_VOICES,
};

/// Owner-side view of the voice graph: at most one voice per sound id, each
/// patched through its own gain into the shared master gain.
pub struct VoiceGraph {
    voices: HashMap<String, Voice>,
    master: Arc<AtomicGain>,
    outgoing: Producer<PlaybackNode>,
    /// Halted nodes coming back from the renderer, dropped on this side.
    retired: Consumer<PlaybackNode>,
    next_node: NodeId,
}

impl VoiceGraph {
    /// Create a graph and the renderer that must be handed to the audio callback.
    pub fn new(master_level: f32, queue_capacity: usize) -> (Self, GraphRenderer) {
        let master = Arc::new(AtomicGain::new(master_level));
        let queue_capacity = queue_capacity.max(1);
        let (outgoing, incoming) = RingBuffer::new(queue_capacity);
        // Room for every node that can be in flight or in the renderer's pool
        let (retire, retired) = RingBuffer::new(queue_capacity + MAX_VOICES);

        let graph = Self {
            voices: HashMap::new(),
            master: master.clone(),
            outgoing,
            retired,
            next_node: 0,
        };
        (graph, GraphRenderer::new(incoming, retire, master))
    }

    /// Start a looping voice for `id`, replacing any voice already playing it.
    ///
    /// A restart plays from the beginning of the buffer. On failure nothing
    /// changes: a voice already playing `id` keeps playing.
    pub fn start(
        &mut self,
        id: &str,
        buffer: Arc<AudioBuffer>,
        initial_gain: f32,
    ) -> Result<(), GraphError> {
        self.reclaim();

        if self.outgoing.is_full() {
            warn!(sound = id, "render queue full, voice not started");
            return Err(GraphError::RenderQueueFull);
        }
        if !self.voices.contains_key(id) && self.voices.len() >= MAX_VOICES {
            warn!(sound = id, limit = MAX_VOICES, "voice limit reached");
            return Err(GraphError::VoiceLimit(MAX_VOICES));
        }

        let node = self.next_node;
        self.next_node += 1;
        let (voice, playback) = Voice::new(node, buffer, clamp_level(initial_gain));

        self.stop(id);
        // Only this side pushes, so the slot checked above is still free
        if self.outgoing.push(playback).is_err() {
            return Err(GraphError::RenderQueueFull);
        }
        self.voices.insert(id.to_owned(), voice);
        Ok(())
    }

    /// Stop the voice for `id`. Returns whether a voice was registered.
    pub fn stop(&mut self, id: &str) -> bool {
        let Some(voice) = self.voices.remove(id) else {
            return false;
        };
        if !voice.halt() {
            trace!(sound = id, node = voice.node(), "voice already halted");
        }
        self.reclaim();
        true
    }

    /// Set a live voice's gain. Returns the applied level, or `None` when
    /// nothing is playing `id`.
    pub fn set_voice_gain(&mut self, id: &str, level: f32) -> Option<f32> {
        self.voices.get(id).map(|voice| voice.set_gain(level))
    }

    /// Returns the clamped level applied.
    pub fn set_master_gain(&self, level: f32) -> f32 {
        self.master.set(level)
    }

    pub fn master_gain(&self) -> f32 {
        self.master.get()
    }

    /// Stop every live voice. Returns how many were stopped.
    pub fn teardown_all(&mut self) -> usize {
        let stopped = self.voices.len();
        for (id, voice) in self.voices.drain() {
            if !voice.halt() {
                trace!(sound = %id, "voice already halted");
            }
        }
        self.reclaim();
        stopped
    }

    /// Drop the nodes the renderer has handed back. Returns how many.
    pub fn reclaim(&mut self) -> usize {
        let mut reclaimed = 0;
        while let Ok(node) = self.retired.pop() {
            trace!(node = node.id(), "playback node reclaimed");
            reclaimed += 1;
        }
        reclaimed
    }

    pub fn is_playing(&self, id: &str) -> bool {
        self.voices.get(id).is_some_and(Voice::is_running)
    }

    pub fn voice(&self, id: &str) -> Option<&Voice> {
        self.voices.get(id)
    }

    pub fn voice_gain(&self, id: &str) -> Option<f32> {
        self.voices.get(id).map(Voice::gain)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.voices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GeneratorSettings, dsp::SoundModel};

    fn buffer(model: SoundModel) -> Arc<AudioBuffer> {
        let settings = GeneratorSettings {
            duration_secs: 0.01,
            ..GeneratorSettings::default()
        };
        Arc::new(AudioBuffer::generate(model, &settings, 8_000, 3))
    }

    #[test]
    fn test_restart_keeps_one_voice() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 8);
        let rain = buffer(SoundModel::Rain);

        graph.start("rain-forest", rain.clone(), 0.6).unwrap();
        let first = graph.voice("rain-forest").unwrap().node();
        graph.start("rain-forest", rain, 0.6).unwrap();

        assert_eq!(graph.len(), 1);
        assert_ne!(graph.voice("rain-forest").unwrap().node(), first);

        let mut out = vec![0.0; 64];
        renderer.render(&mut out, 2);
        assert_eq!(renderer.active_nodes(), 1);
    }

    #[test]
    fn test_stop_leaves_nothing_for_teardown() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 8);
        graph.start("fireplace", buffer(SoundModel::Fireplace), 0.6).unwrap();
        assert!(graph.stop("fireplace"));
        assert!(!graph.is_playing("fireplace"));
        assert!(!graph.stop("fireplace"));
        assert_eq!(graph.teardown_all(), 0);

        let mut out = vec![1.0; 64];
        renderer.render(&mut out, 2);
        assert_eq!(renderer.active_nodes(), 0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_gain_on_missing_voice_is_noop() {
        let (mut graph, _renderer) = VoiceGraph::new(1.0, 8);
        assert_eq!(graph.set_voice_gain("nonexistent-id", 0.5), None);
    }

    #[test]
    fn test_gains_clamped() {
        let (mut graph, _renderer) = VoiceGraph::new(1.0, 8);
        graph.start("ocean-waves", buffer(SoundModel::Ocean), 4.0).unwrap();
        assert_eq!(graph.voice_gain("ocean-waves"), Some(1.0));
        assert_eq!(graph.set_voice_gain("ocean-waves", -1.0), Some(0.0));
        assert_eq!(graph.set_master_gain(1.5), 1.0);
        assert_eq!(graph.set_master_gain(f32::NAN), 0.0);
    }

    #[test]
    fn test_master_scales_every_voice() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 8);
        let noise = buffer(SoundModel::WhiteNoise);
        graph.start("white-noise", noise.clone(), 1.0).unwrap();
        graph.set_master_gain(0.5);

        let mut out = vec![0.0; 2];
        renderer.render(&mut out, 2);
        assert_eq!(out[0], noise.channel(0)[0] * 0.5);
    }

    #[test]
    fn test_full_queue_registers_nothing() {
        let (mut graph, _renderer) = VoiceGraph::new(1.0, 1);
        graph.start("rain-forest", buffer(SoundModel::Rain), 0.6).unwrap();
        let err = graph.start("thunderstorm", buffer(SoundModel::Thunder), 0.6);
        assert_eq!(err, Err(GraphError::RenderQueueFull));
        assert!(!graph.is_playing("thunderstorm"));
        assert!(graph.is_playing("rain-forest"));
    }

    #[test]
    fn test_full_queue_keeps_playing_voice() {
        let (mut graph, _renderer) = VoiceGraph::new(1.0, 1);
        let rain = buffer(SoundModel::Rain);
        graph.start("rain-forest", rain.clone(), 0.6).unwrap();
        let node = graph.voice("rain-forest").unwrap().node();

        assert_eq!(
            graph.start("rain-forest", rain, 0.6),
            Err(GraphError::RenderQueueFull)
        );
        assert!(graph.is_playing("rain-forest"));
        assert_eq!(graph.voice("rain-forest").unwrap().node(), node);
    }

    #[test]
    fn test_stopped_nodes_dropped_on_owner_side() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 4);
        let noise = buffer(SoundModel::WhiteNoise);
        graph.start("white-noise", noise.clone(), 0.6).unwrap();
        let mut out = vec![0.0; 16];
        renderer.render(&mut out, 2);
        assert_eq!(Arc::strong_count(&noise), 2);

        graph.stop("white-noise");
        renderer.render(&mut out, 2);
        // The renderer handed the node back instead of dropping it
        assert_eq!(renderer.active_nodes(), 0);
        assert_eq!(Arc::strong_count(&noise), 2);

        assert_eq!(graph.reclaim(), 1);
        assert_eq!(Arc::strong_count(&noise), 1);
    }

    #[test]
    fn test_restarts_without_render_never_fill_queue() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 2);
        let rain = buffer(SoundModel::Rain);
        for _ in 0..10 {
            graph.start("rain-forest", rain.clone(), 0.6).unwrap();
            renderer.sync();
        }
        assert_eq!(renderer.active_nodes(), 1);
        assert!(graph.reclaim() <= 1);
    }

    #[test]
    fn test_voice_limit() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, MAX_VOICES + 1);
        let noise = buffer(SoundModel::WhiteNoise);
        for i in 0..MAX_VOICES {
            graph.start(&format!("hum-{i}"), noise.clone(), 0.1).unwrap();
        }
        assert_eq!(
            graph.start("one-too-many", noise.clone(), 0.1),
            Err(GraphError::VoiceLimit(MAX_VOICES))
        );
        // Restarting a live sound is still allowed
        graph.start("hum-0", noise, 0.1).unwrap();

        let mut out = vec![0.0; 8];
        renderer.render(&mut out, 2);
        assert_eq!(renderer.active_nodes(), MAX_VOICES);
        assert_eq!(graph.len(), MAX_VOICES);
    }

    #[test]
    fn test_teardown_stops_all() {
        let (mut graph, mut renderer) = VoiceGraph::new(1.0, 8);
        graph.start("rain-forest", buffer(SoundModel::Rain), 0.6).unwrap();
        graph.start("morning-birds", buffer(SoundModel::Birds), 0.6).unwrap();
        let mut out = vec![0.0; 32];
        renderer.render(&mut out, 2);
        assert_eq!(renderer.active_nodes(), 2);

        assert_eq!(graph.teardown_all(), 2);
        assert!(graph.is_empty());
        renderer.render(&mut out, 2);
        assert_eq!(renderer.active_nodes(), 0);
    }
}
