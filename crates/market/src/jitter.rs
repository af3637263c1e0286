use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness seam for the mock pricing tables. Production wiring seeds from
/// entropy; tests seed explicitly so every price is reproducible.
pub struct Jitter {
    rng: Mutex<StdRng>,
}

impl Jitter {
    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Multiplier drawn uniformly from `1.0 ± spread`. A poisoned lock yields
    /// the neutral factor rather than a panic in a pricing path.
    pub fn factor(&self, spread: f64) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(1.0 - spread..=1.0 + spread),
            Err(_) => 1.0,
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}
