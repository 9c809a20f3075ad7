// src/evaluate.rs

use rayon::prelude::*;
use std::path::Path;

use crate::error::Result;
use crate::layout::{
    parse_parameter_dir, EvaluationMode, ParameterDir, ASSIGNMENTS_FILE, QUERY_TAXA_FILE,
    REF_TAXA_FILE,
};
use crate::lineage::{categorize, find_last_common_ancestor, ReferencePrefixes};
use crate::report::write_evaluation_summary;
use crate::taxdb::{read_classifier_assignments, read_taxonomy_table};
use crate::types::{EvaluationRow, Lineage, OutcomeCounts, RecordOutcome, TaxonomyTable};

/// Outcome of comparing one classifier's assignments against the truth.
#[derive(Debug, Clone, Default)]
pub struct TableEvaluation {
    /// Deepest expected lineage in the query table.
    pub depth: usize,
    pub counts: OutcomeCounts,
    /// Histogram of LCA depths, indexed `0..=depth`.
    pub mismatch_level_list: Vec<usize>,
    pub outcomes: Vec<RecordOutcome>,
}

/// Compare every query in `expected` with its observation.
///
/// A query absent from `observed` is scored as an empty lineage. The
/// resolvable depth of each query is capped by `holdout_level` (novel-taxa
/// runs) and by how much of its lineage `reference` contains.
pub fn evaluate_assignments(
    expected: &TaxonomyTable,
    observed: &TaxonomyTable,
    reference: Option<&ReferencePrefixes>,
    holdout_level: Option<usize>,
) -> TableEvaluation {
    let depth = expected.iter().map(|(_, l)| l.depth()).max().unwrap_or(0);
    let unobserved = Lineage::default();

    let mut eval = TableEvaluation {
        depth,
        mismatch_level_list: vec![0; depth + 1],
        outcomes: Vec::with_capacity(expected.len()),
        ..Default::default()
    };
    let mut missing = 0usize;

    for (id, exp) in expected.iter() {
        let obs = match observed.get(id) {
            Some(l) => l.truncated(exp.depth()),
            None => {
                missing += 1;
                unobserved.clone()
            }
        };

        let lca_depth = find_last_common_ancestor(&obs.ranks, &exp.ranks);
        let observed_depth = obs.resolved_depth();

        let mut resolvable_depth = exp.resolved_depth();
        if let Some(level) = holdout_level {
            resolvable_depth = resolvable_depth.min(level);
        }
        if let Some(prefixes) = reference {
            resolvable_depth = resolvable_depth.min(prefixes.support(exp));
        }

        let category = categorize(lca_depth, observed_depth, resolvable_depth);
        eval.counts.record(category);
        eval.mismatch_level_list[lca_depth] += 1;
        eval.outcomes.push(RecordOutcome {
            id: id.to_string(),
            lca_depth,
            observed_depth,
            resolvable_depth,
            category,
        });
    }

    if missing > 0 {
        log::debug!("{missing} of {} queries had no assignment", expected.len());
    }
    eval
}

/// Evaluate one `<dataset dir>/<dataset dir>/<method>/<params>` directory.
///
/// Reads `<input_root>/<dataset dir>/query_taxa.tsv` (required),
/// `<input_root>/<dataset dir>/ref_taxa.tsv` (optional) and the directory's
/// `query_tax_assignments.txt` (required).
pub fn evaluate_parameter_dir<P: AsRef<Path>>(dir: &ParameterDir, input_root: P) -> Result<EvaluationRow> {
    let split_dir = input_root.as_ref().join(&dir.dataset_dir);

    // 1. Ground truth and, if present, the reference the classifier trained on
    let expected = read_taxonomy_table(split_dir.join(QUERY_TAXA_FILE))?;
    let ref_path = split_dir.join(REF_TAXA_FILE);
    let reference = if ref_path.is_file() {
        Some(ReferencePrefixes::from_table(&read_taxonomy_table(&ref_path)?))
    } else {
        None
    };

    // 2. Classifier output
    let observed = read_classifier_assignments(dir.path.join(ASSIGNMENTS_FILE))?;

    // 3. Compare
    let eval = evaluate_assignments(&expected, &observed, reference.as_ref(), dir.holdout_level);

    log::info!(
        "Evaluated {} / {} / {} iter {}: {} queries, {} exact",
        dir.dataset,
        dir.method,
        dir.parameters,
        dir.iteration,
        eval.counts.total(),
        eval.counts.matches
    );

    Ok(EvaluationRow {
        dataset: dir.dataset.clone(),
        holdout_level: dir.holdout_level,
        iteration: dir.iteration,
        method: dir.method.clone(),
        parameters: dir.parameters.clone(),
        depth: eval.depth,
        precision: eval.counts.precision(),
        recall: eval.counts.recall(),
        f_measure: eval.counts.f_measure(),
        counts: eval.counts,
        mismatch_level_list: eval.mismatch_level_list,
        outcomes: eval.outcomes,
    })
}

/// Score every parameter directory and write the summary table to
/// `summary_path`.
///
/// Directories are independent and evaluated in parallel; rows come back in
/// the order of `param_dirs`. Any unreadable or malformed input aborts the
/// whole evaluation, since a partial count would skew every ratio.
pub fn novel_taxa_classification_evaluation<P, Q, R>(
    param_dirs: &[P],
    input_root: Q,
    summary_path: R,
    mode: EvaluationMode,
) -> Result<Vec<EvaluationRow>>
where
    P: AsRef<Path>,
    Q: AsRef<Path> + Sync,
    R: AsRef<Path>,
{
    let parsed = param_dirs
        .iter()
        .map(|p| parse_parameter_dir(p.as_ref(), mode))
        .collect::<Result<Vec<_>>>()?;

    let rows = parsed
        .par_iter()
        .map(|dir| evaluate_parameter_dir(dir, &input_root))
        .collect::<Result<Vec<_>>>()?;

    write_evaluation_summary(summary_path, &rows, mode)?;
    Ok(rows)
}
