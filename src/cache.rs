//! Lazily generated, memoized loop buffers.
//!
//! `get` returns the cached buffer when there is one. Otherwise the first
//! caller for an id registers an in-flight slot and generates; every caller
//! that arrives while that generation runs blocks on the same slot and
//! receives the same `Arc`. Generation therefore runs at most once per id.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, OnceLock,
    },
    time::Instant,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{buffer::AudioBuffer, config::GeneratorSettings, dsp::SoundModel};

type Slot = Arc<OnceLock<Arc<AudioBuffer>>>;

pub struct BufferCache {
    settings: GeneratorSettings,
    seed: Option<u64>,
    ready: Mutex<HashMap<String, Arc<AudioBuffer>>>,
    in_flight: Mutex<HashMap<String, Slot>>,
    /// Bumped by `clear` so generations started before it are not re-cached.
    epoch: AtomicU64,
    generations: AtomicUsize,
}

impl BufferCache {
    pub fn new(settings: GeneratorSettings, seed: Option<u64>) -> Self {
        Self {
            settings,
            seed,
            ready: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            generations: AtomicUsize::new(0),
        }
    }

    /// Return the buffer for `id`, generating it on first use.
    pub fn get(&self, id: &str, sample_rate: u32) -> Arc<AudioBuffer> {
        if let Some(buffer) = self.cached(id) {
            debug!(sound = id, "buffer cache hit");
            return buffer;
        }

        let (slot, epoch) = {
            let mut in_flight = self.in_flight.lock();
            // A generation may have finished between the check above and this lock.
            if let Some(buffer) = self.cached(id) {
                return buffer;
            }
            let slot = in_flight.entry(id.to_owned()).or_default().clone();
            (slot, self.epoch.load(Ordering::Acquire))
        };

        let buffer = slot
            .get_or_init(|| Arc::new(self.generate(id, sample_rate)))
            .clone();

        let mut in_flight = self.in_flight.lock();
        if self.epoch.load(Ordering::Acquire) == epoch {
            self.ready
                .lock()
                .entry(id.to_owned())
                .or_insert_with(|| buffer.clone());
        }
        if in_flight.get(id).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
            in_flight.remove(id);
        }

        buffer
    }

    pub fn cached(&self, id: &str) -> Option<Arc<AudioBuffer>> {
        self.ready.lock().get(id).cloned()
    }

    /// Drop every cached buffer and forget in-flight generations.
    pub fn clear(&self) {
        let mut in_flight = self.in_flight.lock();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        in_flight.clear();
        self.ready.lock().clear();
    }

    /// How many buffers have been synthesized over the cache's lifetime.
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn len(&self) -> usize {
        self.ready.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generate(&self, id: &str, sample_rate: u32) -> AudioBuffer {
        self.generations.fetch_add(1, Ordering::Relaxed);
        let model = SoundModel::for_sound(id);
        let seed = match self.seed {
            Some(seed) => seed ^ fnv1a64(id),
            None => rand::random(),
        };

        let started = Instant::now();
        let buffer = AudioBuffer::generate(model, &self.settings, sample_rate, seed);
        debug!(
            sound = id,
            ?model,
            frames = buffer.frames(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated buffer"
        );
        buffer
    }
}

/// Stable 64-bit FNV-1a, used to derive per-sound seeds from a fixed seed.
fn fnv1a64(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}
