pub mod buffer; // Generated loop buffers
pub mod cache; // Load-once buffer memoization
pub mod catalog;
pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Voices, gains and the realtime renderer
pub mod io;
pub mod mixer;

pub use buffer::AudioBuffer;
pub use catalog::{SoundCategory, SoundDescriptor, CATALOG};
pub use config::{GeneratorSettings, MixerConfig};
pub use dsp::{EventShaping, SoundModel};
pub use error::EngineError;
pub use mixer::AmbientMixer;

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Live voices the renderer holds without reallocating.
pub const MAX_VOICES: usize = 64;
/// Level a sound plays at until the user changes it.
pub const DEFAULT_VOLUME: f32 = 0.6;
