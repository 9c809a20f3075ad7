// src/lineage.rs

use ahash::AHashSet;

use crate::types::{is_placeholder, Lineage, OutcomeCategory, TaxonomyTable};

/// Return how many leading ranks `observed` and `expected` agree on.
///
/// The scan runs from the root rank downward and stops at the first position
/// where the labels differ, where either label is a placeholder (`s__`, empty,
/// `Unassigned`), or where either lineage runs out. The result therefore lies
/// in `[0, min(observed.len(), expected.len())]`.
pub fn find_last_common_ancestor<A, B>(observed: &[A], expected: &[B]) -> usize
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    observed
        .iter()
        .zip(expected.iter())
        .take_while(|(o, e)| {
            let (o, e) = (o.as_ref().trim(), e.as_ref().trim());
            !is_placeholder(o) && !is_placeholder(e) && o == e
        })
        .count()
}

/// Assign the outcome category for one query.
///
/// * `lca_depth` - agreement depth between observation and truth
/// * `observed_depth` - resolved depth of the observation
/// * `resolvable_depth` - deepest rank the truth is recoverable at
pub fn categorize(lca_depth: usize, observed_depth: usize, resolvable_depth: usize) -> OutcomeCategory {
    // observed_depth >= lca_depth always holds
    if lca_depth >= resolvable_depth {
        if observed_depth > resolvable_depth {
            OutcomeCategory::Overclassification
        } else {
            OutcomeCategory::Match
        }
    } else if observed_depth < resolvable_depth && lca_depth == observed_depth {
        OutcomeCategory::Underclassification
    } else {
        OutcomeCategory::Misclassification
    }
}

/// Every taxon prefix present in a reference taxonomy, used to decide how
/// deep a query's true lineage is actually represented.
#[derive(Debug, Default)]
pub struct ReferencePrefixes {
    prefixes: AHashSet<String>,
}

impl ReferencePrefixes {
    pub fn from_table(reference: &TaxonomyTable) -> Self {
        let mut prefixes = AHashSet::new();
        for (_, lineage) in reference.iter() {
            for depth in 1..=lineage.resolved_depth() {
                prefixes.insert(lineage.prefix_key(depth));
            }
        }
        Self { prefixes }
    }

    /// Length of the longest resolved prefix of `expected` found in the
    /// reference.
    pub fn support(&self, expected: &Lineage) -> usize {
        (1..=expected.resolved_depth())
            .take_while(|&d| self.prefixes.contains(&expected.prefix_key(d)))
            .count()
    }
}
