//! Device-free output for tests and headless rendering.
//!
//! The host hands out outputs that share one `OfflineProbe`. Nothing pulls
//! audio on its own; call `OfflineProbe::render` to run the attached renderer
//! exactly like an audio callback would.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::EngineError,
    graph::GraphRenderer,
    io::{AudioHost, OutputDevice},
};

#[derive(Default)]
struct ProbeState {
    renderer: Option<GraphRenderer>,
    channels: usize,
    suspended: bool,
    closed: bool,
    opens: usize,
}

/// Shared view into the offline output: render blocks and inspect device state.
#[derive(Clone, Default)]
pub struct OfflineProbe(Arc<Mutex<ProbeState>>);

impl OfflineProbe {
    /// Render `frames` interleaved frames. Suspended, closed or unattached
    /// outputs produce silence.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut state = self.0.lock();
        let channels = state.channels.max(1);
        let mut out = vec![0.0; frames * channels];
        if state.suspended || state.closed {
            return out;
        }
        if let Some(renderer) = state.renderer.as_mut() {
            renderer.render(&mut out, channels);
        }
        out
    }

    /// Playback nodes attached after the last rendered block.
    pub fn active_nodes(&self) -> usize {
        self.0
            .lock()
            .renderer
            .as_ref()
            .map_or(0, GraphRenderer::active_nodes)
    }

    pub fn is_suspended(&self) -> bool {
        self.0.lock().suspended
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().closed
    }

    /// How many times an output was opened on this host.
    pub fn opens(&self) -> usize {
        self.0.lock().opens
    }
}

#[derive(Clone)]
pub struct OfflineHost {
    sample_rate: u32,
    channels: usize,
    available: bool,
    probe: OfflineProbe,
}

impl OfflineHost {
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
            available: true,
            probe: OfflineProbe::default(),
        }
    }

    /// A host whose device can never be opened.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(48_000, 2)
        }
    }

    pub fn probe(&self) -> OfflineProbe {
        self.probe.clone()
    }
}

impl AudioHost for OfflineHost {
    fn open_output(&self) -> Result<Box<dyn OutputDevice>, EngineError> {
        if !self.available {
            return Err(EngineError::AudioDeviceUnavailable(
                "offline output disabled".into(),
            ));
        }

        {
            let mut state = self.probe.0.lock();
            state.opens += 1;
            state.channels = self.channels;
            state.suspended = true;
            state.closed = false;
        }

        Ok(Box::new(OfflineOutput {
            sample_rate: self.sample_rate,
            channels: self.channels,
            probe: self.probe.clone(),
        }))
    }
}

struct OfflineOutput {
    sample_rate: u32,
    channels: usize,
    probe: OfflineProbe,
}

impl OutputDevice for OfflineOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn attach(&mut self, renderer: GraphRenderer) {
        self.probe.0.lock().renderer = Some(renderer);
    }

    fn is_suspended(&self) -> bool {
        self.probe.is_suspended()
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let mut state = self.probe.0.lock();
        if state.closed {
            return Err(EngineError::AudioDeviceUnavailable("output closed".into()));
        }
        state.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        self.probe.0.lock().suspended = true;
        Ok(())
    }

    fn sync_graph(&mut self) {
        let mut state = self.probe.0.lock();
        if state.closed {
            return;
        }
        if let Some(renderer) = state.renderer.as_mut() {
            renderer.sync();
        }
    }

    fn close(&mut self) {
        let mut state = self.probe.0.lock();
        state.closed = true;
        state.renderer = None;
    }
}
