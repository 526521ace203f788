//! Engine configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::EventShaping, DEFAULT_VOLUME};

/// How each sound's loop is synthesized.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Loop length in seconds.
    pub duration_secs: f32,
    pub channels: usize,
    pub shaping: EventShaping,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            channels: 2,
            shaping: EventShaping::SingleSample,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MixerConfig {
    /// Gain a sound starts at when the user never set one.
    pub default_volume: f32,
    pub master_volume: f32,
    pub generator: GeneratorSettings,
    /// Fixed seed for reproducible buffers. `None` draws a fresh seed per sound.
    pub seed: Option<u64>,
    /// Voices that may be waiting for the audio callback to pick them up.
    pub render_queue_capacity: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            default_volume: DEFAULT_VOLUME,
            master_volume: 1.0,
            generator: GeneratorSettings::default(),
            seed: None,
            render_queue_capacity: 64,
        }
    }
}
