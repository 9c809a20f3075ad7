// src/per_level.rs

use crate::types::{f_measure, ratio, EvaluationRow, PerLevelRow, RecordOutcome};

/// Tallies for one taxonomic level.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStats {
    /// Records whose truth is recoverable at this level.
    pub resolvable: usize,
    /// Resolvable records whose observation is right at this level.
    pub matches: usize,
    /// Resolvable records that stopped short of this level without a wrong call.
    pub underclassifications: usize,
    pub misclassifications: usize,
}

impl LevelStats {
    pub fn precision(&self) -> f64 {
        ratio(self.matches, self.matches + self.misclassifications)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.matches, self.resolvable)
    }

    pub fn f_measure(&self) -> f64 {
        f_measure(self.precision(), self.recall())
    }
}

/// Score the records at rank index `level`.
///
/// Only records with `resolvable_depth > level` take part. A record matches
/// when its observation agrees through rank `level`; it is underclassified
/// when it agrees as far as it went but stopped before `level`.
pub fn level_stats(outcomes: &[RecordOutcome], level: usize) -> LevelStats {
    let mut stats = LevelStats::default();
    for o in outcomes.iter().filter(|o| o.resolvable_depth > level) {
        stats.resolvable += 1;
        if o.lca_depth > level {
            stats.matches += 1;
        } else if o.observed_depth <= level && o.lca_depth == o.observed_depth {
            stats.underclassifications += 1;
        } else {
            stats.misclassifications += 1;
        }
    }
    stats
}

/// Break each evaluation row down into one row per taxonomic level, from
/// level 1 to `depth - 1`. Level 0 (the root rank) is left out.
///
/// `match_ratio` is taken over all records of the row, so it never increases
/// with depth.
pub fn extract_per_level_accuracy(rows: &[EvaluationRow]) -> Vec<PerLevelRow> {
    let mut out = Vec::with_capacity(rows.iter().map(|r| r.depth.saturating_sub(1)).sum());

    for row in rows {
        let total = row.outcomes.len();
        for level in 1..row.depth {
            let stats = level_stats(&row.outcomes, level);
            out.push(PerLevelRow {
                dataset: row.dataset.clone(),
                holdout_level: row.holdout_level,
                iteration: row.iteration,
                method: row.method.clone(),
                parameters: row.parameters.clone(),
                level,
                precision: stats.precision(),
                recall: stats.recall(),
                f_measure: stats.f_measure(),
                match_ratio: ratio(stats.matches, total),
            });
        }
    }

    out
}
