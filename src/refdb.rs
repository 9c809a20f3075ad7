//src/refdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ahash::AHashSet;

use crate::error::{Error, Result};
use crate::types::ReferenceDatabase;

/// Column names of the descriptor table, after the leading name column.
pub const DESCRIPTOR_COLUMNS: [&str; 7] = [
    "Reference file path",
    "Reference tax path",
    "Reference id",
    "Fwd primer",
    "Rev primer",
    "Fwd primer id",
    "Rev primer id",
];

/// Parses a reference descriptor table in the format:
/// ```text
/// name\tReference file path\tReference tax path\tReference id\tFwd primer\tRev primer\tFwd primer id\tRev primer id
/// B1-REF\tref1.fasta\tref1_taxa.tsv\tref1\tGTGCCAGCMGCCGCGGTAA\tATTAGAWACCCBDGTAGTCC\t515f\t806r
/// ```
/// The first non-comment line is the header and is not validated beyond its
/// width. Database names must be unique.
pub fn read_reference_databases<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceDatabase>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    let mut databases = Vec::new();
    let mut seen = AHashSet::new();
    let mut header_seen = false;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result.map_err(|e| Error::io(path, e))?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
        if parts.len() != DESCRIPTOR_COLUMNS.len() + 1 {
            return Err(Error::malformed(
                path,
                line_no,
                format!(
                    "expected {} columns, found {}",
                    DESCRIPTOR_COLUMNS.len() + 1,
                    parts.len()
                ),
            ));
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        let name = parts[0];
        if name.is_empty() {
            return Err(Error::malformed(path, line_no, "empty reference name"));
        }
        if !seen.insert(name.to_string()) {
            return Err(Error::DuplicateId {
                path: path.to_path_buf(),
                id: name.to_string(),
            });
        }

        databases.push(ReferenceDatabase {
            name: name.to_string(),
            sequences_path: PathBuf::from(parts[1]),
            taxonomy_path: PathBuf::from(parts[2]),
            reference_id: parts[3].to_string(),
            fwd_primer: parts[4].to_string(),
            rev_primer: parts[5].to_string(),
            fwd_primer_id: parts[6].to_string(),
            rev_primer_id: parts[7].to_string(),
        });
    }

    Ok(databases)
}
