//! Fixed-length multi-channel sample buffers.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::{
    config::GeneratorSettings,
    dsp::{ChannelSynth, SoundModel},
};

/// A generated loop. Immutable once built and shared read-only between voices.
#[derive(Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Synthesize a buffer for `model`.
    ///
    /// A master PCG stream seeded with `seed` hands each channel its own
    /// independently seeded stream, so channels are uncorrelated but the whole
    /// buffer is reproducible from `seed`.
    pub fn generate(
        model: SoundModel,
        settings: &GeneratorSettings,
        sample_rate: u32,
        seed: u64,
    ) -> Self {
        let frames = (settings.duration_secs.max(0.0) as f64 * sample_rate as f64) as usize;
        let mut master = Pcg64::seed_from_u64(seed);

        let channels = (0..settings.channels.max(1))
            .map(|_| {
                let rng = Pcg64::seed_from_u64(master.random());
                let mut synth = ChannelSynth::new(model, sample_rate, settings.shaping, rng);
                let mut samples = vec![0.0; frames];
                synth.fill(&mut samples, 0);
                for sample in samples.iter_mut() {
                    *sample = sample.clamp(-1.0, 1.0);
                }
                samples
            })
            .collect();

        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Largest absolute sample across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::EventShaping;

    fn settings(duration_secs: f32) -> GeneratorSettings {
        GeneratorSettings {
            duration_secs,
            channels: 2,
            shaping: EventShaping::SingleSample,
        }
    }

    #[test]
    fn test_shape_matches_settings() {
        let buffer = AudioBuffer::generate(SoundModel::Rain, &settings(0.5), 8_000, 1);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frames(), 4_000);
        assert_eq!(buffer.sample_rate(), 8_000);
        assert_eq!(buffer.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_channels_are_independent() {
        let buffer = AudioBuffer::generate(SoundModel::WhiteNoise, &settings(0.1), 8_000, 5);
        assert_ne!(buffer.channel(0), buffer.channel(1));
    }

    #[test]
    fn test_seed_reproduces_buffer() {
        let a = AudioBuffer::generate(SoundModel::Fireplace, &settings(0.2), 8_000, 99);
        let b = AudioBuffer::generate(SoundModel::Fireplace, &settings(0.2), 8_000, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_samples_within_unit_range() {
        for model in SoundModel::ALL {
            let buffer = AudioBuffer::generate(model, &settings(1.0), 8_000, 3);
            assert!(buffer.peak() <= 1.0, "{model:?} peaked at {}", buffer.peak());
        }
    }

    #[test]
    #[should_panic]
    fn test_channel_out_of_range_panics() {
        let buffer = AudioBuffer::generate(SoundModel::Ocean, &settings(0.01), 8_000, 4);
        buffer.channel(2);
    }
}
