// src/report.rs

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::layout::EvaluationMode;
use crate::types::{EvaluationRow, PerLevelRow};

fn format_list(values: &[usize]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Tab-separated evaluation summary with a header row. The `level` column
/// is only present for novel-taxa runs.
pub fn render_evaluation_summary(rows: &[EvaluationRow], mode: EvaluationMode) -> String {
    let with_level = mode == EvaluationMode::NovelTaxa;
    let mut output = String::new();

    output.push_str("Dataset\t");
    if with_level {
        output.push_str("level\t");
    }
    output.push_str(
        "iteration\tMethod\tParameters\tmatch_ratio\toverclassification_ratio\t\
         underclassification_ratio\tmisclassification_ratio\tPrecision\tRecall\t\
         F-measure\tmismatch_level_list\n",
    );

    for row in rows {
        output.push_str(&row.dataset);
        output.push('\t');
        if with_level {
            if let Some(level) = row.holdout_level {
                write!(output, "{level}").unwrap();
            }
            output.push('\t');
        }
        writeln!(
            output,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.iteration,
            row.method,
            row.parameters,
            row.match_ratio(),
            row.overclassification_ratio(),
            row.underclassification_ratio(),
            row.misclassification_ratio(),
            row.precision,
            row.recall,
            row.f_measure,
            format_list(&row.mismatch_level_list)
        )
        .unwrap();
    }
    output
}

/// Tab-separated per-level table. The holdout rank of novel-taxa runs is
/// written as `holdout_level` so it doesn't clash with the per-row `level`.
pub fn render_per_level_accuracy(rows: &[PerLevelRow]) -> String {
    let with_holdout = rows.iter().any(|r| r.holdout_level.is_some());
    let mut output = String::new();

    output.push_str("Dataset\t");
    if with_holdout {
        output.push_str("holdout_level\t");
    }
    output.push_str("iteration\tMethod\tParameters\tlevel\tPrecision\tRecall\tF-measure\tmatch_ratio\n");

    for row in rows {
        output.push_str(&row.dataset);
        output.push('\t');
        if with_holdout {
            if let Some(level) = row.holdout_level {
                write!(output, "{level}").unwrap();
            }
            output.push('\t');
        }
        writeln!(
            output,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.iteration,
            row.method,
            row.parameters,
            row.level,
            row.precision,
            row.recall,
            row.f_measure,
            row.match_ratio
        )
        .unwrap();
    }
    output
}

pub fn write_evaluation_summary<P: AsRef<Path>>(
    path: P,
    rows: &[EvaluationRow],
    mode: EvaluationMode,
) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_evaluation_summary(rows, mode)).map_err(|e| Error::io(path, e))
}

pub fn write_per_level_accuracy<P: AsRef<Path>>(path: P, rows: &[PerLevelRow]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_per_level_accuracy(rows)).map_err(|e| Error::io(path, e))
}
