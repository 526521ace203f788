//! The playback graph: one voice per sound, each through its own gain into a
//! shared master gain.
//!
//! The graph is split in two. `VoiceGraph` lives with the control thread and
//! owns the keyed voice map. `GraphRenderer` lives inside the audio callback.
//! New playback nodes cross over a lock-free SPSC ring; gain changes and stops
//! are atomic writes the renderer observes on its next block, so no control
//! operation ever waits on the realtime thread.

/// Owner-side voice map and graph operations.
pub mod manager;
/// Realtime mixing of live playback nodes.
pub mod renderer;
/// Voices and their render-side playback nodes.
pub mod voice;

pub use manager::VoiceGraph;
pub use renderer::GraphRenderer;
pub use voice::{NodeId, PlaybackNode, Voice};
