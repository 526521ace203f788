//! The fixed set of sounds offered to the presentation layer.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::dsp::SoundModel;

/// Display grouping. The engine never looks at it.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    Nature,
    Noise,
    Cozy,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub category: SoundCategory,
    pub model: SoundModel,
}

pub const CATALOG: &[SoundDescriptor] = &[
    SoundDescriptor {
        id: "rain-forest",
        name: "Rain Forest",
        category: SoundCategory::Nature,
        model: SoundModel::Rain,
    },
    SoundDescriptor {
        id: "ocean-waves",
        name: "Ocean Waves",
        category: SoundCategory::Nature,
        model: SoundModel::Ocean,
    },
    SoundDescriptor {
        id: "morning-birds",
        name: "Morning Birds",
        category: SoundCategory::Nature,
        model: SoundModel::Birds,
    },
    SoundDescriptor {
        id: "white-noise",
        name: "White Noise",
        category: SoundCategory::Noise,
        model: SoundModel::WhiteNoise,
    },
    SoundDescriptor {
        id: "fireplace",
        name: "Fireplace",
        category: SoundCategory::Cozy,
        model: SoundModel::Fireplace,
    },
    SoundDescriptor {
        id: "thunderstorm",
        name: "Thunderstorm",
        category: SoundCategory::Nature,
        model: SoundModel::Thunder,
    },
];

pub fn find(id: &str) -> Option<&'static SoundDescriptor> {
    CATALOG.iter().find(|sound| sound.id == id)
}
