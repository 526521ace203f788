use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{buffer::AudioBuffer, dsp::AtomicGain};

/// Identifies a playback node across the control/render boundary.
pub type NodeId = u64;

/// State shared between a voice and the node that renders it.
#[derive(Debug)]
pub(crate) struct VoiceControl {
    gain: AtomicGain,
    running: AtomicBool,
}

impl VoiceControl {
    fn new(gain: f32) -> Self {
        Self {
            gain: AtomicGain::new(gain),
            running: AtomicBool::new(true),
        }
    }

    /// Flip to halted. Returns `false` if it was already halted.
    fn halt(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn gain(&self) -> f32 {
        self.gain.get()
    }
}

/// One looping playback instance of one sound, as seen by the control thread.
pub struct Voice {
    node: NodeId,
    control: Arc<VoiceControl>,
}

impl Voice {
    /// Build a voice and the node that will render it.
    pub(crate) fn new(node: NodeId, buffer: Arc<AudioBuffer>, gain: f32) -> (Self, PlaybackNode) {
        let control = Arc::new(VoiceControl::new(gain));
        let playback = PlaybackNode {
            id: node,
            buffer,
            control: control.clone(),
            position: 0,
        };
        (Self { node, control }, playback)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn gain(&self) -> f32 {
        self.control.gain()
    }

    /// Set the live gain. Returns the clamped level applied.
    pub fn set_gain(&self, level: f32) -> f32 {
        self.control.gain.set(level)
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Stop the voice. Halting an already-halted voice is not an error and
    /// returns `false`.
    pub fn halt(&self) -> bool {
        self.control.halt()
    }
}

/// The render-side half of a voice: loops its buffer from frame 0.
pub struct PlaybackNode {
    id: NodeId,
    buffer: Arc<AudioBuffer>,
    control: Arc<VoiceControl>,
    position: usize,
}

impl PlaybackNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_halted(&self) -> bool {
        !self.control.is_running()
    }

    /// Mix this node into interleaved `out`, scaled by its gain and `master`.
    ///
    /// Output channel `c` reads buffer channel `c % buffer_channels`.
    pub fn render_add(&mut self, out: &mut [f32], channels: usize, master: f32) {
        let frames = self.buffer.frames();
        let source_channels = self.buffer.channel_count();
        if frames == 0 || source_channels == 0 || channels == 0 {
            return;
        }

        let gain = self.control.gain() * master;
        for frame in out.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample += self.buffer.channel(ch % source_channels)[self.position] * gain;
            }
            self.position += 1;
            if self.position == frames {
                self.position = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GeneratorSettings, dsp::SoundModel};

    fn buffer() -> Arc<AudioBuffer> {
        let settings = GeneratorSettings {
            duration_secs: 0.001,
            ..GeneratorSettings::default()
        };
        Arc::new(AudioBuffer::generate(SoundModel::WhiteNoise, &settings, 4_000, 2))
    }

    #[test]
    fn test_halt_twice_is_tolerated() {
        let (voice, node) = Voice::new(1, buffer(), 0.6);
        assert!(voice.halt());
        assert!(!voice.halt());
        assert!(node.is_halted());
    }

    #[test]
    fn test_node_loops_and_scales() {
        let source = buffer();
        let frames = source.frames();
        let (voice, mut node) = Voice::new(1, source.clone(), 0.5);
        assert_eq!(voice.gain(), 0.5);

        let mut out = vec![0.0; (frames + 1) * 2];
        node.render_add(&mut out, 2, 0.5);

        assert_eq!(out[0], source.channel(0)[0] * 0.25);
        assert_eq!(out[1], source.channel(1)[0] * 0.25);
        // wrapped back to frame 0
        assert_eq!(out[frames * 2], source.channel(0)[0] * 0.25);
    }

    #[test]
    fn test_gain_change_applies_live() {
        let (voice, mut node) = Voice::new(1, buffer(), 0.6);
        assert_eq!(voice.set_gain(3.0), 1.0);
        let mut out = vec![0.0; 2];
        node.render_add(&mut out, 2, 1.0);
        assert_eq!(out[0], node.buffer.channel(0)[0]);
    }
}
