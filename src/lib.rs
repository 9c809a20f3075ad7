// src/lib.rs
pub mod error;
pub mod evaluate;
pub mod fasta;
pub mod layout;
pub mod lineage;
pub mod per_level;
pub mod primers;
pub mod refdb;
pub mod report;
pub mod simulate;
pub mod taxdb;
pub mod types;

use std::path::Path;

pub use crate::error::{Error, Result};
pub use crate::evaluate::novel_taxa_classification_evaluation;
pub use crate::layout::{discover_parameter_dirs, EvaluationMode};
pub use crate::lineage::find_last_common_ancestor;
pub use crate::per_level::extract_per_level_accuracy;
pub use crate::simulate::{generate_simulated_datasets, Holdout, SimulationParams};

use crate::report::{render_evaluation_summary, render_per_level_accuracy};
use crate::types::{EvaluationRow, PerLevelRow};

/// Evaluation rows for a batch of classifier runs together with their
/// per-level breakdown.
pub struct EvaluationResults {
    pub mode: EvaluationMode,
    /// One row per parameter directory, in input order.
    pub rows: Vec<EvaluationRow>,
    /// `rows` broken down by taxonomic level.
    pub per_level: Vec<PerLevelRow>,
}

impl EvaluationResults {
    /// Generate the summary table text on demand
    pub fn get_summary_text(&self) -> String {
        render_evaluation_summary(&self.rows, self.mode)
    }

    /// Generate the per-level table text on demand
    pub fn get_per_level_text(&self) -> String {
        render_per_level_accuracy(&self.per_level)
    }
}

/// Evaluate every parameter directory against the simulated splits under
/// `input_root`, write the summary table to `summary_path`, and derive the
/// per-level breakdown.
pub fn evaluate_runs<P, Q, R>(
    param_dirs: &[P],
    input_root: Q,
    summary_path: R,
    mode: EvaluationMode,
) -> Result<EvaluationResults>
where
    P: AsRef<Path>,
    Q: AsRef<Path> + Sync,
    R: AsRef<Path>,
{
    // 1. Score each run (writes the summary)
    let rows = novel_taxa_classification_evaluation(param_dirs, input_root, summary_path, mode)?;

    // 2. Per-level breakdown
    let per_level = extract_per_level_accuracy(&rows);

    Ok(EvaluationResults {
        mode,
        rows,
        per_level,
    })
}
