//! Simulated-annealing covering-array generation.
//!
//! An outer search probes candidate suite sizes between heuristic bounds; an
//! inner local search tries to turn a random N-row suite into a covering one
//! by single-cell mutations under the Metropolis acceptance criterion.

pub mod annealer;
pub mod occupancy;
pub mod rng;

pub use annealer::{Annealer, Mode};
pub use occupancy::Occupancy;
pub use rng::generation_rng;
