use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/*
Shared Noise Table
==================

Every noise-based sound in the engine (snare rattle, hi-hats, vinyl texture,
the breath layer inside a sustained voice) reads from the same one-second
buffer of uniform white noise. Generating it once and sharing it by reference
keeps voice construction allocation-free and makes the noise content
deterministic for a given seed.

The table is immutable after creation, so concurrent readers need no
synchronization. Each reader owns a `NoiseLoop` cursor that wraps at the end
of the buffer; readers started at different times naturally decorrelate.
*/

/// One second of uniformly distributed samples in [-1, 1), built once and
/// shared by reference everywhere noise is needed.
#[derive(Clone)]
pub struct NoiseTable {
    samples: Arc<[f32]>,
}

/// Seed used by `NoiseTable::new`. Any value works; fixing one keeps the
/// default texture identical across runs.
const DEFAULT_SEED: u64 = 0xc0ff_ee00_beef_cafe;

impl NoiseTable {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_SEED)
    }

    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        let len = (sample_rate as usize).max(1);
        let mut rng = SmallRng::seed_from_u64(seed);
        let samples: Vec<f32> = (0..len).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
        Self {
            samples: samples.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }

    /// True when both tables read from the same underlying buffer.
    pub fn shares_buffer(&self, other: &NoiseTable) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

/// Looping read cursor over a [`NoiseTable`].
pub struct NoiseLoop {
    table: NoiseTable,
    position: usize,
}

impl NoiseLoop {
    pub fn new(table: NoiseTable) -> Self {
        Self { table, position: 0 }
    }

    /// Start the cursor somewhere other than zero so that simultaneous
    /// readers do not emit identical samples.
    pub fn with_offset(table: NoiseTable, offset: usize) -> Self {
        let position = offset % table.len();
        Self { table, position }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = self.table.sample(self.position);
        self.position += 1;
        if self.position >= self.table.len() {
            self.position = 0;
        }
        value
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
