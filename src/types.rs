//src/types.rs

use ahash::AHashMap;
use std::fmt;
use std::path::PathBuf;

/// Ordered rank labels from the root rank (kingdom/domain) downward, e.g.
/// `k__Bacteria; p__Firmicutes; ...; s__brevis`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Lineage {
    pub ranks: Vec<String>,
}

/// Whether a rank label carries no taxon: empty, a bare rank prefix such as
/// `s__`, or the `Unassigned` marker classifiers emit.
pub fn is_placeholder(label: &str) -> bool {
    let label = label.trim();
    if label.is_empty() || label.eq_ignore_ascii_case("unassigned") {
        return true;
    }
    match label.split_once("__") {
        Some((_, rest)) => rest.trim().is_empty(),
        None => false,
    }
}

impl Lineage {
    /// Parse a `;`-delimited taxonomy string. Labels are trimmed; an empty
    /// string yields an empty lineage.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Self::default();
        }
        Self {
            ranks: s.split(';').map(|r| r.trim().to_string()).collect(),
        }
    }

    pub fn depth(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Number of leading ranks that name a real taxon.
    pub fn resolved_depth(&self) -> usize {
        self.ranks
            .iter()
            .take_while(|r| !is_placeholder(r))
            .count()
    }

    /// Copy of the first `depth` ranks (or all of them if shorter).
    pub fn truncated(&self, depth: usize) -> Lineage {
        Lineage {
            ranks: self.ranks.iter().take(depth).cloned().collect(),
        }
    }

    /// Key for the taxon defined by the first `depth` ranks.
    pub fn prefix_key(&self, depth: usize) -> String {
        let end = depth.min(self.ranks.len());
        self.ranks[..end].join("; ")
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ranks.join("; "))
    }
}

/// Sequence identifier -> lineage, keeping the order in which ids were read
/// so written tables and evaluation rows are reproducible.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    ids: Vec<String>,
    lineages: AHashMap<String, Lineage>,
}

impl TaxonomyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns `false` (and leaves the table unchanged) if
    /// the id is already present.
    pub fn insert(&mut self, id: String, lineage: Lineage) -> bool {
        if self.lineages.contains_key(&id) {
            return false;
        }
        self.ids.push(id.clone());
        self.lineages.insert(id, lineage);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Lineage> {
        self.lineages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lineages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Lineage)> + '_ {
        self.ids
            .iter()
            .filter_map(move |id| self.lineages.get(id).map(|l| (id.as_str(), l)))
    }

    /// New table holding only `ids` (in the given order) that exist here.
    pub fn subset<'a, I>(&self, ids: I) -> TaxonomyTable
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out = TaxonomyTable::new();
        for id in ids {
            if let Some(lineage) = self.lineages.get(id) {
                out.insert(id.clone(), lineage.clone());
            }
        }
        out
    }
}

/// One named reference resource used to simulate benchmark datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDatabase {
    pub name: String,
    pub sequences_path: PathBuf,
    pub taxonomy_path: PathBuf,
    pub reference_id: String,
    pub fwd_primer: String,
    pub rev_primer: String,
    pub fwd_primer_id: String,
    pub rev_primer_id: String,
}

/// A minimal representation of a reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNASequence {
    pub id: String,
    pub header_line: String,
    pub seq: String,
}

/// How an observed lineage relates to the truth for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    Match,
    Overclassification,
    Underclassification,
    Misclassification,
}

/// Comparison result for a single query sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub id: String,
    /// Agreeing leading ranks between observed and the full expected lineage.
    pub lca_depth: usize,
    /// Resolved depth of the (truncated) observation.
    pub observed_depth: usize,
    /// Deepest rank the truth can be recovered at, given the reference.
    pub resolvable_depth: usize,
    pub category: OutcomeCategory,
}

/// Category tallies for one result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub matches: usize,
    pub overclassifications: usize,
    pub underclassifications: usize,
    pub misclassifications: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, category: OutcomeCategory) {
        match category {
            OutcomeCategory::Match => self.matches += 1,
            OutcomeCategory::Overclassification => self.overclassifications += 1,
            OutcomeCategory::Underclassification => self.underclassifications += 1,
            OutcomeCategory::Misclassification => self.misclassifications += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matches + self.overclassifications + self.underclassifications + self.misclassifications
    }

    /// `matches / (matches + over + mis)`; 0 when nothing was called.
    pub fn precision(&self) -> f64 {
        ratio(
            self.matches,
            self.matches + self.overclassifications + self.misclassifications,
        )
    }

    /// `matches / total`. Overclassified records are missed truths as well
    /// as wrong calls, so they sit in both denominators.
    pub fn recall(&self) -> f64 {
        ratio(self.matches, self.total())
    }

    pub fn f_measure(&self) -> f64 {
        f_measure(self.precision(), self.recall())
    }
}

/// `num / den`, with an empty denominator reported as 0.
pub fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f_measure(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// One summary row per (dataset, method, parameter set, iteration).
#[derive(Debug, Clone)]
pub struct EvaluationRow {
    pub dataset: String,
    /// Rank removed from the reference; only set for novel-taxa runs.
    pub holdout_level: Option<usize>,
    pub iteration: usize,
    pub method: String,
    pub parameters: String,
    /// Number of ranks in the expected lineages (7 for kingdom..species).
    pub depth: usize,
    pub counts: OutcomeCounts,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
    /// `mismatch_level_list[d]` = number of records whose LCA depth is `d`.
    pub mismatch_level_list: Vec<usize>,
    pub outcomes: Vec<RecordOutcome>,
}

impl EvaluationRow {
    fn count_ratio(&self, n: usize) -> f64 {
        ratio(n, self.counts.total())
    }

    pub fn match_ratio(&self) -> f64 {
        self.count_ratio(self.counts.matches)
    }

    pub fn overclassification_ratio(&self) -> f64 {
        self.count_ratio(self.counts.overclassifications)
    }

    pub fn underclassification_ratio(&self) -> f64 {
        self.count_ratio(self.counts.underclassifications)
    }

    pub fn misclassification_ratio(&self) -> f64 {
        self.count_ratio(self.counts.misclassifications)
    }
}

/// Accuracy of one result set at one taxonomic level.
#[derive(Debug, Clone, PartialEq)]
pub struct PerLevelRow {
    pub dataset: String,
    pub holdout_level: Option<usize>,
    pub iteration: usize,
    pub method: String,
    pub parameters: String,
    /// Rank index, 1 = phylum for a kingdom-rooted lineage.
    pub level: usize,
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
    pub match_ratio: f64,
}
