use thiserror::Error;

/// Failures surfaced by the mixer facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The output device could not be created or resumed.
    #[error("audio output device unavailable: {0}")]
    AudioDeviceUnavailable(String),
    /// The mixer was disposed and cannot be used again.
    #[error("mixer has been disposed")]
    EngineDisposed,
    /// Every voice slot is taken by another sound.
    #[error("cannot play more than {0} sounds at once")]
    VoiceLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("render queue is full; the audio callback is not draining it")]
    RenderQueueFull,
    #[error("all {0} voice slots are in use")]
    VoiceLimit(usize),
}

impl From<GraphError> for EngineError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::RenderQueueFull => EngineError::AudioDeviceUnavailable(err.to_string()),
            GraphError::VoiceLimit(limit) => EngineError::VoiceLimit(limit),
        }
    }
}
