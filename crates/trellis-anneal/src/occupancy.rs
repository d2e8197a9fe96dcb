//! Occupancy counts over all t-way combinations during local search.

use trellis_model::combinatorics::{enumerate_value_combos, value_combo_rank};
use trellis_model::Model;

/// Sentinel for a combination invalid under the model; such cells never
/// participate in scoring.
pub const INVALID: i32 = -1;

/// How many suite rows currently cover each (subset, value-combo) cell.
///
/// Distinct from the model's global coverage matrix: the occupancy table is
/// built once per generation run and cloned per inner-search attempt.
/// Rollback of a rejected move is the exact inverse of its two row
/// applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    cells: Vec<Vec<i32>>,
}

impl Occupancy {
    /// Build the zeroed table, marking model-invalid combinations with
    /// [`INVALID`]. The model must be initialized.
    pub fn from_model(model: &Model) -> Self {
        let domains = model.domain_sizes();
        let mut cells = Vec::with_capacity(model.subsets().len());
        for pos in model.subsets() {
            let combos = enumerate_value_combos(pos, domains);
            let mut row = Vec::with_capacity(combos.len());
            for sch in &combos {
                let cell = if model.is_valid_where(pos, sch) { 0 } else { INVALID };
                row.push(cell);
            }
            cells.push(row);
        }
        Self { cells }
    }

    /// Count a test case in: returns how many valid combinations rose from
    /// zero occupancy (coverage gain).
    pub fn add_row(&mut self, model: &Model, test: &[i32]) -> i64 {
        self.shift(model, test, 1)
    }

    /// Count a test case out: returns how many valid combinations dropped to
    /// zero occupancy (coverage loss).
    pub fn remove_row(&mut self, model: &Model, test: &[i32]) -> i64 {
        self.shift(model, test, -1)
    }

    fn shift(&mut self, model: &Model, test: &[i32], dir: i32) -> i64 {
        let domains = model.domain_sizes();
        let mut change = 0;
        for (i, pos) in model.subsets().iter().enumerate() {
            let sch: Vec<i32> = pos.iter().map(|&p| test[p]).collect();
            let col = value_combo_rank(pos, &sch, domains);
            let cell = &mut self.cells[i][col];
            if *cell == INVALID {
                continue;
            }
            if dir < 0 {
                *cell -= 1;
                debug_assert!(*cell >= 0, "occupancy below zero");
                if *cell == 0 {
                    change += 1;
                }
            } else {
                if *cell == 0 {
                    change += 1;
                }
                *cell += 1;
            }
        }
        change
    }

    /// Number of valid combinations with nonzero occupancy.
    pub fn covered(&self) -> i64 {
        self.cells
            .iter()
            .flatten()
            .filter(|&&c| c > 0)
            .count() as i64
    }
}
