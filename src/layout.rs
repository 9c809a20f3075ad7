// src/layout.rs
//
// On-disk naming shared by the dataset generator, the classifier runners and
// the evaluator:
//
//   <root>/cross-validated/<db>-iter<i>/{query_taxa.tsv, ref_taxa.tsv, ...}
//   <root>/novel-taxa-simulations/<db>-L<level>-iter<i>/{...}
//   <results>/<dataset dir>/<dataset dir>/<method>/<params>/query_tax_assignments.txt

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

pub const CROSS_VALIDATED_DIR: &str = "cross-validated";
pub const NOVEL_TAXA_DIR: &str = "novel-taxa-simulations";

pub const QUERY_TAXA_FILE: &str = "query_taxa.tsv";
pub const REF_TAXA_FILE: &str = "ref_taxa.tsv";
pub const QUERY_SEQS_FILE: &str = "query.fasta";
pub const REF_SEQS_FILE: &str = "ref_seqs.fasta";
pub const ASSIGNMENTS_FILE: &str = "query_tax_assignments.txt";

/// Which benchmark a result directory belongs to. Only changes how dataset
/// directory names are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    NovelTaxa,
    CrossValidated,
}

impl FromStr for EvaluationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "novel-taxa" => Ok(Self::NovelTaxa),
            "cross-validated" => Ok(Self::CrossValidated),
            other => Err(Error::InvalidInput(format!(
                "unknown evaluation mode '{other}' (expected novel-taxa or cross-validated)"
            ))),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NovelTaxa => "novel-taxa",
            Self::CrossValidated => "cross-validated",
        })
    }
}

/// Directory name for one simulated split.
pub fn dataset_dir_name(name: &str, holdout_level: Option<usize>, iteration: usize) -> String {
    match holdout_level {
        Some(level) => format!("{name}-L{level}-iter{iteration}"),
        None => format!("{name}-iter{iteration}"),
    }
}

/// Identifiers recovered from a parameter directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDir {
    pub path: PathBuf,
    /// Name of the simulated split directory, e.g. `B1-REF-L6-iter0`.
    pub dataset_dir: String,
    pub dataset: String,
    pub holdout_level: Option<usize>,
    pub iteration: usize,
    pub method: String,
    pub parameters: String,
}

fn segment(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

/// Split `.../<dataset dir>/<method>/<params>` into its identifiers.
///
/// In novel-taxa mode the dataset dir is `<dataset>-L<level>-iter<i>`; in
/// cross-validated mode it is `<dataset>-iter<i>` and any `-L<level>` stays
/// part of the dataset name.
pub fn parse_parameter_dir(path: &Path, mode: EvaluationMode) -> Result<ParameterDir> {
    let parameters = segment(path).ok_or_else(|| Error::layout(path, "missing parameter segment"))?;
    let method_dir = path
        .parent()
        .ok_or_else(|| Error::layout(path, "missing method segment"))?;
    let method = segment(method_dir).ok_or_else(|| Error::layout(path, "missing method segment"))?;
    let dataset_dir = method_dir
        .parent()
        .and_then(segment)
        .ok_or_else(|| Error::layout(path, "missing dataset segment"))?;

    let (dataset, iteration) = dataset_dir
        .rsplit_once("-iter")
        .ok_or_else(|| Error::layout(path, format!("'{dataset_dir}' has no -iter<N> suffix")))?;
    let iteration: usize = iteration
        .parse()
        .map_err(|_| Error::layout(path, format!("'{dataset_dir}' has a non-numeric iteration")))?;

    let (dataset, holdout_level) = match mode {
        EvaluationMode::CrossValidated => (dataset, None),
        EvaluationMode::NovelTaxa => {
            let (name, level) = dataset
                .rsplit_once("-L")
                .ok_or_else(|| Error::layout(path, format!("'{dataset_dir}' has no -L<level> part")))?;
            let level: usize = level
                .parse()
                .map_err(|_| Error::layout(path, format!("'{dataset_dir}' has a non-numeric level")))?;
            (name, Some(level))
        }
    };

    Ok(ParameterDir {
        path: path.to_path_buf(),
        dataset_dir: dataset_dir.to_string(),
        dataset: dataset.to_string(),
        holdout_level,
        iteration,
        method: method.to_string(),
        parameters: parameters.to_string(),
    })
}

fn subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Every `<root>/*/*/*/*` directory holding a classifier assignment file,
/// sorted.
pub fn discover_parameter_dirs<P: AsRef<Path>>(results_root: P) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for dataset in subdirs(results_root.as_ref())? {
        for run in subdirs(&dataset)? {
            for method in subdirs(&run)? {
                for params in subdirs(&method)? {
                    if params.join(ASSIGNMENTS_FILE).is_file() {
                        found.push(params);
                    }
                }
            }
        }
    }
    Ok(found)
}
