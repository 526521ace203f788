//! Gain levels and amplitude scaling.

use std::sync::atomic::{AtomicU32, Ordering};

/*
Gain Levels
===========

Every level the engine accepts is a linear amplitude multiplier in [0.0, 1.0]:

    1.0  →  unity, the buffer plays as generated
    0.5  →  about -6 dB
    0.0  →  silence

A voice's perceived loudness is the product of its own gain and the master
gain, applied per sample at render time:

    output[i] = buffer[i] × voice_gain × master_gain

The UI speaks in percent (0..=100). `percent_to_level` divides by 100 and
clamps, so 150 % becomes 1.0 and -10 % becomes 0.0. Anything that is not a
number is treated as silence rather than propagated into the mix.
*/

/// Clamp a linear level into `[0.0, 1.0]`. NaN maps to `0.0`.
#[inline]
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Convert a UI percentage into a clamped linear level.
#[inline]
pub fn percent_to_level(percent: f32) -> f32 {
    clamp_level(percent / 100.0)
}

/// Convert a linear level back to a whole UI percentage.
#[inline]
pub fn level_to_percent(level: f32) -> u8 {
    (clamp_level(level) * 100.0).round() as u8
}

/// Lock-free gain level shared between the control thread and the audio callback.
///
/// Stored as the raw bits of an `f32`. Relaxed ordering is enough: a level is a
/// single independent value and the renderer only needs to see it eventually.
#[derive(Debug)]
pub struct AtomicGain(AtomicU32);

impl AtomicGain {
    pub fn new(level: f32) -> Self {
        Self(AtomicU32::new(clamp_level(level).to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Store a level, clamped. Returns the level actually stored.
    #[inline]
    pub fn set(&self, level: f32) -> f32 {
        let level = clamp_level(level);
        self.0.store(level.to_bits(), Ordering::Relaxed);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level_bounds() {
        assert_eq!(clamp_level(1.5), 1.0);
        assert_eq!(clamp_level(-0.2), 0.0);
        assert_eq!(clamp_level(0.25), 0.25);
        assert_eq!(clamp_level(f32::NAN), 0.0);
    }

    #[test]
    fn test_percent_conversion_clamps() {
        assert_eq!(percent_to_level(150.0), 1.0);
        assert_eq!(percent_to_level(-10.0), 0.0);
        assert_eq!(percent_to_level(60.0), 0.6);
        assert_eq!(level_to_percent(0.6), 60);
    }

    #[test]
    fn test_atomic_gain_stores_clamped() {
        let gain = AtomicGain::new(2.0);
        assert_eq!(gain.get(), 1.0);
        assert_eq!(gain.set(0.3), 0.3);
        assert_eq!(gain.get(), 0.3);
        assert_eq!(gain.set(-4.0), 0.0);
    }
}
