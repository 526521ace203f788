//! Closed-form signal models for each ambient sound.

use std::f64::consts::TAU;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog;

/*
Ambient Signal Models
=====================

Each sound is a sum of a few closed-form terms evaluated at time t (seconds)
for sample index i:

    t = i / sample_rate

Terms come in three flavours:

    noise(w)      uniform random in [-w, w). Broadband hiss.
    sine(f, w)    w × sin(2π f t). A steady tone or a slow envelope.
    event         a term that only sounds when a per-sample coin flip lands.

Models
------

  rain        (noise(0.3) + sine(60 Hz, 0.1)) / 2
  ocean       (sine(0.2 Hz, 0.5) + noise(0.2)) × |sin(2π 0.05 t)|
  birds       noise(0.05) + chirp       chirp: p = 0.001, f ∈ [1000, 3000) Hz, w = 0.3
  white       noise(0.15)
  fireplace   crackle + sine(30 Hz, 0.2) + noise(0.1)
                                        crackle: p = 0.01, amplitude ∈ [0, 0.8)
  thunder     noise(0.3) + boom          boom: p = 0.0001, 50 Hz, w = 0.8

Nothing is normalized. Fireplace and thunder can exceed 1.0 when an event lands
on a noise peak; the buffer clips those samples.

Event Shaping
-------------

In the plain model a triggered chirp or boom is evaluated for exactly one
sample, which is heard as a click rather than a bird or thunder. `Sustained`
keeps the event sounding for a short window with a linear decay so it reads as
the thing it is named after. `SingleSample` stays the default.

    SingleSample   chirp: 1 sample        boom: 1 sample
    Sustained      chirp: 120 ms decay    boom: 600 ms decay

Crackles are clicks by nature and are always single-sample.

Randomness
----------

A model never reaches for ambient randomness. The caller hands each channel
its own `Rng`, so the same seed always yields the same samples.
*/

const RAIN_NOISE: f32 = 0.3;
const RAIN_HUM_HZ: f64 = 60.0;
const RAIN_HUM: f32 = 0.1;

const OCEAN_SWELL_HZ: f64 = 0.2;
const OCEAN_SWELL: f32 = 0.5;
const OCEAN_NOISE: f32 = 0.2;
const OCEAN_TIDE_HZ: f64 = 0.05;

const BIRDS_FLOOR: f32 = 0.05;
const BIRDS_CHIRP_CHANCE: f64 = 0.001;
const BIRDS_CHIRP_MIN_HZ: f64 = 1000.0;
const BIRDS_CHIRP_MAX_HZ: f64 = 3000.0;
const BIRDS_CHIRP: f32 = 0.3;
const BIRDS_CHIRP_SECS: f64 = 0.12;

const WHITE_NOISE: f32 = 0.15;

const FIRE_CRACKLE_CHANCE: f64 = 0.01;
const FIRE_CRACKLE_MAX: f32 = 0.8;
const FIRE_RUMBLE_HZ: f64 = 30.0;
const FIRE_RUMBLE: f32 = 0.2;
const FIRE_HISS: f32 = 0.1;

const THUNDER_RAIN: f32 = 0.3;
const THUNDER_CHANCE: f64 = 0.0001;
const THUNDER_BOOM_HZ: f64 = 50.0;
const THUNDER_BOOM: f32 = 0.8;
const THUNDER_BOOM_SECS: f64 = 0.6;

/// The synthesis model behind a sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundModel {
    Rain,
    Ocean,
    Birds,
    WhiteNoise,
    Fireplace,
    Thunder,
}

impl SoundModel {
    pub const ALL: [SoundModel; 6] = [
        SoundModel::Rain,
        SoundModel::Ocean,
        SoundModel::Birds,
        SoundModel::WhiteNoise,
        SoundModel::Fireplace,
        SoundModel::Thunder,
    ];

    /// Resolve the model for a sound id.
    ///
    /// Ids outside the catalog (custom or future sounds) fall back to white noise.
    pub fn for_sound(id: &str) -> Self {
        catalog::find(id)
            .map(|sound| sound.model)
            .unwrap_or(SoundModel::WhiteNoise)
    }
}

/// How long probability-triggered events keep sounding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventShaping {
    /// A triggered chirp or boom is evaluated for one sample only.
    #[default]
    SingleSample,
    /// A triggered chirp or boom decays linearly over a short window.
    Sustained,
}

/// A triggered tone that may span several samples.
#[derive(Debug, Clone, Copy)]
struct ToneEvent {
    frequency: f64,
    weight: f32,
    remaining: u32,
    length: u32,
}

impl ToneEvent {
    fn next(&mut self, t: f64) -> f32 {
        let envelope = self.remaining as f32 / self.length as f32;
        self.remaining -= 1;
        self.weight * envelope * (TAU * self.frequency * t).sin() as f32
    }

    fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

/// Generates one channel of a model, sample by sample.
pub struct ChannelSynth<R> {
    model: SoundModel,
    sample_rate: f64,
    shaping: EventShaping,
    rng: R,
    event: Option<ToneEvent>,
    events_triggered: usize,
}

impl<R: Rng> ChannelSynth<R> {
    pub fn new(model: SoundModel, sample_rate: u32, shaping: EventShaping, rng: R) -> Self {
        Self {
            model,
            sample_rate: sample_rate as f64,
            shaping,
            rng,
            event: None,
            events_triggered: 0,
        }
    }

    /// Number of chirps, crackles or booms triggered so far.
    pub fn events_triggered(&self) -> usize {
        self.events_triggered
    }

    /// Fill `out` with consecutive samples starting at `start_index`.
    pub fn fill(&mut self, out: &mut [f32], start_index: usize) {
        for (offset, sample) in out.iter_mut().enumerate() {
            *sample = self.next_sample(start_index + offset);
        }
    }

    /// Evaluate the model at sample `index`.
    pub fn next_sample(&mut self, index: usize) -> f32 {
        let t = index as f64 / self.sample_rate;

        match self.model {
            SoundModel::Rain => (self.noise(RAIN_NOISE) + sine(RAIN_HUM_HZ, RAIN_HUM, t)) * 0.5,
            SoundModel::Ocean => {
                let tide = (TAU * OCEAN_TIDE_HZ * t).sin().abs() as f32;
                (sine(OCEAN_SWELL_HZ, OCEAN_SWELL, t) + self.noise(OCEAN_NOISE)) * tide
            }
            SoundModel::Birds => {
                let floor = self.noise(BIRDS_FLOOR);
                if self.rng.random_bool(BIRDS_CHIRP_CHANCE) {
                    let frequency = self
                        .rng
                        .random_range(BIRDS_CHIRP_MIN_HZ..BIRDS_CHIRP_MAX_HZ);
                    self.trigger(frequency, BIRDS_CHIRP, BIRDS_CHIRP_SECS);
                }
                floor + self.sound_event(t)
            }
            SoundModel::WhiteNoise => self.noise(WHITE_NOISE),
            SoundModel::Fireplace => {
                let crackle = if self.rng.random_bool(FIRE_CRACKLE_CHANCE) {
                    self.events_triggered += 1;
                    self.rng.random::<f32>() * FIRE_CRACKLE_MAX
                } else {
                    0.0
                };
                crackle + sine(FIRE_RUMBLE_HZ, FIRE_RUMBLE, t) + self.noise(FIRE_HISS)
            }
            SoundModel::Thunder => {
                let rain = self.noise(THUNDER_RAIN);
                if self.rng.random_bool(THUNDER_CHANCE) {
                    self.trigger(THUNDER_BOOM_HZ, THUNDER_BOOM, THUNDER_BOOM_SECS);
                }
                rain + self.sound_event(t)
            }
        }
    }

    fn noise(&mut self, weight: f32) -> f32 {
        self.rng.random_range(-weight..weight)
    }

    fn trigger(&mut self, frequency: f64, weight: f32, sustain_secs: f64) {
        let length = match self.shaping {
            EventShaping::SingleSample => 1,
            EventShaping::Sustained => ((sustain_secs * self.sample_rate) as u32).max(1),
        };
        self.events_triggered += 1;
        self.event = Some(ToneEvent {
            frequency,
            weight,
            remaining: length,
            length,
        });
    }

    fn sound_event(&mut self, t: f64) -> f32 {
        let Some(event) = self.event.as_mut() else {
            return 0.0;
        };
        let sample = event.next(t);
        if event.is_done() {
            self.event = None;
        }
        sample
    }
}

#[inline]
fn sine(frequency: f64, weight: f32, t: f64) -> f32 {
    weight * (TAU * frequency * t).sin() as f32
}
