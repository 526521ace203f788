//! Low-level signal primitives used by the buffer generator and the renderer.
//!
//! Everything here is pure with respect to the random source it is handed and
//! safe to call from any thread. Generation is never done on the realtime path;
//! only the gain helpers are touched from the audio callback.

/// Gain levels, percent conversion and the lock-free shared level.
pub mod gain;
/// Closed-form models for each ambient sound.
pub mod models;

pub use gain::{clamp_level, percent_to_level, AtomicGain};
pub use models::{ChannelSynth, EventShaping, SoundModel};
