// Purpose - audio device backends the mixer renders into

pub mod cpal_output;
pub mod offline;

pub use cpal_output::{CpalHost, CpalOutput};
pub use offline::{OfflineHost, OfflineProbe};

use crate::{error::EngineError, graph::GraphRenderer};

/// Opens output devices. The mixer asks for one lazily, on the first `play`.
pub trait AudioHost: Send + Sync {
    fn open_output(&self) -> Result<Box<dyn OutputDevice>, EngineError>;
}

/// An open output the graph renderer is attached to.
pub trait OutputDevice: Send {
    /// Native sample rate. Buffers are generated at this rate.
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> usize;

    /// Hand the renderer to the device's callback.
    fn attach(&mut self, renderer: GraphRenderer);

    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), EngineError>;

    fn suspend(&mut self) -> Result<(), EngineError>;

    /// Let the renderer take in queued nodes and hand back halted ones
    /// between blocks. Devices with a running callback do this on their own.
    fn sync_graph(&mut self) {}

    /// Release the device. Further calls are no-ops.
    fn close(&mut self);
}
