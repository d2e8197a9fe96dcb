//! Constraint handling for combinatorial test models.
//!
//! Raw constraints arrive as conjunctions of forbidden (parameter, value)
//! assignments. This crate maps every assignment to a global integer id,
//! rewrites each conjunction as a disjunction of negated ids, and closes the
//! set under implicit-parameter expansion into a minimal forbidden tuple
//! (MFT) set. A complete or partial test case is invalid exactly when it
//! matches at least one MFT.

pub mod checker;
pub mod conflict;
pub mod forbidden;
pub mod value_map;

pub use checker::MftChecker;
pub use conflict::ConflictCounter;
pub use forbidden::{parse_literal, Forbidden, LiteralError};
pub use value_map::ValueMap;

/// Marker for a free parameter in a partial test case.
pub const UNASSIGNED: i32 = -1;
