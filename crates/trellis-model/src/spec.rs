//! Model input description and its JSON form.

use serde::{Deserialize, Serialize};

/// Input description of a combinatorial test model.
///
/// Each constraint is a conjunction of `"parameterIndex/valueIndex"` pairs
/// denoting a forbidden simultaneous assignment; constraints are independent
/// of each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub parameters: usize,
    /// Domain size per parameter, in parameter order.
    pub values: Vec<usize>,
    pub strength: usize,
    #[serde(default)]
    pub constraints: Vec<Vec<String>>,
}

/// Errors at model construction.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InputFormat(#[from] trellis_constraint::LiteralError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub fn parse_spec(json: &str) -> Result<ModelSpec, SpecError> {
    Ok(serde_json::from_str(json)?)
}
