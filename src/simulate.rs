// src/simulate.rs

use ahash::{AHashMap, AHashSet};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::fasta::{read_fasta_records, write_fasta_records};
use crate::layout::{
    dataset_dir_name, CROSS_VALIDATED_DIR, NOVEL_TAXA_DIR, QUERY_SEQS_FILE, QUERY_TAXA_FILE,
    REF_SEQS_FILE, REF_TAXA_FILE,
};
use crate::primers::extract_amplicon;
use crate::taxdb::{read_taxonomy_table, write_taxonomy_table};
use crate::types::{DNASequence, ReferenceDatabase, TaxonomyTable};

/// Which sampling regime to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Holdout {
    /// Hold out sequences whose exact lineage stays in the reference.
    CrossValidated,
    /// Remove every sequence of whole taxa at this rank index (6 = species
    /// for a kingdom-rooted lineage), so queries are novel at that rank.
    NovelTaxa(usize),
}

impl Holdout {
    fn stream(self) -> u64 {
        match self {
            Self::CrossValidated => 0,
            Self::NovelTaxa(level) => level as u64 + 1,
        }
    }
}

impl FromStr for Holdout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cv" | "cross-validated" => Ok(Self::CrossValidated),
            other => other
                .parse::<usize>()
                .map(Self::NovelTaxa)
                .map_err(|_| Error::InvalidInput(format!("'{other}' is neither 'cv' nor a rank level"))),
        }
    }
}

impl fmt::Display for Holdout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossValidated => f.write_str("cross-validated"),
            Self::NovelTaxa(level) => write!(f, "novel-taxa L{level}"),
        }
    }
}

/// Trim reference sequences to the amplicon between the database's primers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmpliconTrim {
    /// Keep only the first `n` bases of each amplicon.
    pub read_length: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Number of disjoint query folds per regime; at least 2.
    pub iterations: usize,
    /// Sequences a taxon needs before it can be held out.
    pub min_count: usize,
    pub holdouts: Vec<Holdout>,
    pub seed: u64,
    pub amplicon: Option<AmpliconTrim>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        let mut holdouts = vec![Holdout::CrossValidated];
        holdouts.extend((1..=6).rev().map(Holdout::NovelTaxa));
        Self {
            iterations: 10,
            min_count: 2,
            holdouts,
            seed: 0,
            amplicon: None,
        }
    }
}

/// One written query/reference split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedDataset {
    pub database: String,
    pub holdout: Holdout,
    pub iteration: usize,
    pub dir: PathBuf,
    pub query_count: usize,
    pub ref_count: usize,
}

/// Shuffle `items` and deal them round-robin into `folds`, starting from a
/// random fold so the first fold isn't always the fullest.
fn deal<T: Clone>(items: &mut [T], folds: &mut [Vec<T>], rng: &mut ChaCha8Rng) {
    if folds.is_empty() || items.is_empty() {
        return;
    }
    items.shuffle(rng);
    let offset = rng.gen_range(0..folds.len());
    let n = folds.len();
    for (j, item) in items.iter().enumerate() {
        folds[(offset + j) % n].push(item.clone());
    }
}

/// Query ids for each cross-validation fold.
///
/// Only fully resolved lineages with at least `max(min_count, 2)` sequences
/// take part. With two or more folds no fold can take every sequence of a
/// lineage, so each query keeps a same-lineage representative in the
/// reference.
pub fn cross_validation_splits(
    taxonomy: &TaxonomyTable,
    iterations: usize,
    min_count: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<Vec<String>> {
    let min_count = min_count.max(2);
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (id, lineage) in taxonomy.iter() {
        if lineage.is_empty() || lineage.resolved_depth() < lineage.depth() {
            continue;
        }
        groups.entry(lineage.to_string()).or_default().push(id.to_string());
    }

    let mut folds = vec![Vec::new(); iterations];
    let mut excluded = 0usize;
    for ids in groups.values_mut() {
        if ids.len() < min_count {
            excluded += 1;
            continue;
        }
        deal(ids, &mut folds, rng);
    }
    log::debug!(
        "cross-validation: {} lineages sampled, {} below {} sequences",
        groups.len() - excluded,
        excluded,
        min_count
    );
    folds
}

/// Query ids for each novel-taxa fold at rank index `level`.
///
/// A taxon at `level` can be held out when it has at least `min_count`
/// sequences and its parent taxon has at least one other child. Children of
/// one parent are spread over the folds, so every fold leaves each parent
/// represented in the reference.
pub fn novel_taxa_splits(
    taxonomy: &TaxonomyTable,
    level: usize,
    iterations: usize,
    min_count: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Vec<String>>> {
    if level == 0 {
        return Err(Error::InvalidInput(
            "novel-taxa level 0 would remove the root taxon".into(),
        ));
    }

    // parent prefix -> child prefix -> sequence ids
    let mut parents: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for (id, lineage) in taxonomy.iter() {
        if lineage.resolved_depth() <= level {
            continue;
        }
        parents
            .entry(lineage.prefix_key(level))
            .or_default()
            .entry(lineage.prefix_key(level + 1))
            .or_default()
            .push(id.to_string());
    }

    let mut folds: Vec<Vec<String>> = vec![Vec::new(); iterations];
    for (parent, children) in &parents {
        if children.len() < 2 {
            log::debug!("L{level}: '{parent}' has a single child taxon, skipped");
            continue;
        }
        let mut eligible: Vec<&String> = children
            .iter()
            .filter(|(_, ids)| ids.len() >= min_count)
            .map(|(child, _)| child)
            .collect();

        let mut child_folds: Vec<Vec<&String>> = vec![Vec::new(); iterations];
        deal(&mut eligible, &mut child_folds, rng);
        for (fold, chosen) in folds.iter_mut().zip(child_folds) {
            for child in chosen {
                fold.extend(children[child].iter().cloned());
            }
        }
    }
    Ok(folds)
}

/// The first `n` bases of `seq`, or all of it when shorter. Cuts on a
/// character boundary so stray non-ASCII input can't split a code point.
fn leading_bases(seq: &str, n: usize) -> &str {
    match seq.char_indices().nth(n) {
        Some((end, _)) => &seq[..end],
        None => seq,
    }
}

/// Load a database's taxonomy and sequences, keeping only ids present in
/// both (and, if trimming, with both primer sites).
fn load_population(
    db: &ReferenceDatabase,
    amplicon: Option<&AmpliconTrim>,
) -> Result<(TaxonomyTable, AHashMap<String, DNASequence>)> {
    let taxonomy = read_taxonomy_table(&db.taxonomy_path)?;
    let records = read_fasta_records(&db.sequences_path)?;

    if amplicon.is_some() && (db.fwd_primer.is_empty() || db.rev_primer.is_empty()) {
        return Err(Error::InvalidInput(format!(
            "{}: amplicon trimming needs both primers",
            db.name
        )));
    }

    let mut sequences: AHashMap<String, DNASequence> = AHashMap::with_capacity(records.len());
    let mut no_amplicon = 0usize;
    for mut record in records {
        if let Some(trim) = amplicon {
            match extract_amplicon(&record.seq, &db.fwd_primer, &db.rev_primer) {
                Some(region) => {
                    record.seq = match trim.read_length {
                        Some(n) => leading_bases(region, n).to_string(),
                        None => region.to_string(),
                    };
                }
                None => {
                    no_amplicon += 1;
                    continue;
                }
            }
        }
        sequences.insert(record.id.clone(), record);
    }
    if no_amplicon > 0 {
        log::warn!(
            "{}: dropped {} sequences without a {}/{} primer pair",
            db.name,
            no_amplicon,
            db.fwd_primer_id,
            db.rev_primer_id
        );
    }

    let with_seqs: Vec<String> = taxonomy
        .ids()
        .iter()
        .filter(|id| sequences.contains_key(id.as_str()))
        .cloned()
        .collect();
    let missing = taxonomy.len() - with_seqs.len();
    if missing > 0 {
        log::warn!("{}: {} taxonomy ids have no usable sequence", db.name, missing);
    }

    Ok((taxonomy.subset(&with_seqs), sequences))
}

/// Write one split's four files under `dir` and return (query, ref) sizes.
fn write_split(
    dir: &Path,
    query_ids: &[String],
    population: &TaxonomyTable,
    sequences: &AHashMap<String, DNASequence>,
) -> Result<(usize, usize)> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let held_out: AHashSet<&str> = query_ids.iter().map(String::as_str).collect();
    let ref_ids: Vec<String> = population
        .ids()
        .iter()
        .filter(|id| !held_out.contains(id.as_str()))
        .cloned()
        .collect();

    // keep the population's order in the query table as well
    let query_ordered: Vec<String> = population
        .ids()
        .iter()
        .filter(|id| held_out.contains(id.as_str()))
        .cloned()
        .collect();

    let query = population.subset(&query_ordered);
    let reference = population.subset(&ref_ids);

    write_taxonomy_table(dir.join(QUERY_TAXA_FILE), &query)?;
    write_taxonomy_table(dir.join(REF_TAXA_FILE), &reference)?;
    write_fasta_records(
        dir.join(QUERY_SEQS_FILE),
        query.ids().iter().filter_map(|id| sequences.get(id)),
    )?;
    write_fasta_records(
        dir.join(REF_SEQS_FILE),
        reference.ids().iter().filter_map(|id| sequences.get(id)),
    )?;

    Ok((query.len(), reference.len()))
}

/// Build cross-validated and novel-taxa query/reference splits for every
/// database, under `output_root/cross-validated/<db>-iter<i>/` and
/// `output_root/novel-taxa-simulations/<db>-L<level>-iter<i>/`.
///
/// Selection is seeded from `params.seed` with one ChaCha stream per regime,
/// so the same inputs always give the same splits.
pub fn generate_simulated_datasets<P: AsRef<Path>>(
    databases: &[ReferenceDatabase],
    output_root: P,
    params: &SimulationParams,
) -> Result<Vec<SimulatedDataset>> {
    if params.iterations < 2 {
        return Err(Error::InvalidInput(format!(
            "need at least 2 iterations to keep held-out lineages in the reference, got {}",
            params.iterations
        )));
    }
    let output_root = output_root.as_ref();
    let mut manifest = Vec::new();

    for db in databases {
        let (population, sequences) = load_population(db, params.amplicon.as_ref())?;
        log::info!("{}: {} sequences available for sampling", db.name, population.len());

        for &holdout in &params.holdouts {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
            rng.set_stream(holdout.stream());

            let (folds, parent_dir, level) = match holdout {
                Holdout::CrossValidated => (
                    cross_validation_splits(&population, params.iterations, params.min_count, &mut rng),
                    output_root.join(CROSS_VALIDATED_DIR),
                    None,
                ),
                Holdout::NovelTaxa(level) => (
                    novel_taxa_splits(&population, level, params.iterations, params.min_count, &mut rng)?,
                    output_root.join(NOVEL_TAXA_DIR),
                    Some(level),
                ),
            };

            for (iteration, query_ids) in folds.iter().enumerate() {
                let dir = parent_dir.join(dataset_dir_name(&db.name, level, iteration));
                let (query_count, ref_count) = write_split(&dir, query_ids, &population, &sequences)?;
                log::info!(
                    "{} {} iter {}: {} query / {} ref -> {}",
                    db.name,
                    holdout,
                    iteration,
                    query_count,
                    ref_count,
                    dir.display()
                );
                manifest.push(SimulatedDataset {
                    database: db.name.clone(),
                    holdout,
                    iteration,
                    dir,
                    query_count,
                    ref_count,
                });
            }
        }
    }

    Ok(manifest)
}
