//! Combinatorial test model.
//!
//! A model is < P, V, t, C >: P parameters with finite domains V, a covering
//! strength t, and forbidding constraints C. The model enumerates every
//! t-way value combination, indexes it with the combinatorial number system
//! and a mixed-radix code, and tracks which combinations a suite still has
//! to cover. Generation algorithms drive the model through `fitness`,
//! `cover` and `uncovered_tuple`.

pub mod combinatorics;
pub mod matrix;
pub mod model;
pub mod spec;
pub mod suite;

pub use matrix::BitMatrix;
pub use model::Model;
pub use spec::{parse_spec, ModelSpec, SpecError};
pub use suite::{TestCase, TestSuite};

pub use trellis_constraint::UNASSIGNED;
