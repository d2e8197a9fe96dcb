//! Deterministic RNG construction for generation runs.
//!
//! One ChaCha8 source per run, threaded explicitly through the search.
//! Same seed -> same suite, always.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// RNG for a generation run; unseeded runs draw from OS entropy.
pub fn generation_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
