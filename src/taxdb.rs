//src/taxdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Lineage, TaxonomyTable};

/// How strictly the column count of a taxonomy table is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Columns {
    /// Ground-truth tables: exactly `id<TAB>lineage`.
    Exact,
    /// Classifier output: `id<TAB>lineage[<TAB>confidence...]`, optional header.
    AtLeast,
}

/// Parses a ground-truth taxonomy table in the format:
/// ```text
/// <seq id>\t<k__A; p__B; ...>
/// ```
/// No header row. Any row without exactly two columns, or a repeated id,
/// fails the whole read.
pub fn read_taxonomy_table<P: AsRef<Path>>(path: P) -> Result<TaxonomyTable> {
    parse_table(path.as_ref(), Columns::Exact)
}

/// Parses a classifier's per-query assignment table. Extra columns (e.g.
/// confidence) are ignored, `#` comments and a `Feature ID` header are
/// skipped.
pub fn read_classifier_assignments<P: AsRef<Path>>(path: P) -> Result<TaxonomyTable> {
    parse_table(path.as_ref(), Columns::AtLeast)
}

fn parse_table(path: &Path, columns: Columns) -> Result<TaxonomyTable> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    let mut table = TaxonomyTable::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result.map_err(|e| Error::io(path, e))?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        if columns == Columns::AtLeast && (line.starts_with('#') || is_header(line)) {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        match columns {
            Columns::Exact if parts.len() != 2 => {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!("expected 2 columns, found {}", parts.len()),
                ));
            }
            Columns::AtLeast if parts.len() < 2 => {
                return Err(Error::malformed(
                    path,
                    line_no,
                    format!("expected at least 2 columns, found {}", parts.len()),
                ));
            }
            _ => {}
        }

        let id = parts[0].trim();
        if id.is_empty() {
            return Err(Error::malformed(path, line_no, "empty sequence identifier"));
        }
        if !table.insert(id.to_string(), Lineage::parse(parts[1])) {
            return Err(Error::DuplicateId {
                path: path.to_path_buf(),
                id: id.to_string(),
            });
        }
    }

    log::debug!("Read {} taxonomy records from {}", table.len(), path.display());
    Ok(table)
}

fn is_header(line: &str) -> bool {
    let first = line.split('\t').next().unwrap_or_default().trim();
    first.eq_ignore_ascii_case("feature id") || first.eq_ignore_ascii_case("featureid")
}

/// Write `id<TAB>lineage` rows in table order.
pub fn write_taxonomy_table<P: AsRef<Path>>(path: P, table: &TaxonomyTable) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    for (id, lineage) in table.iter() {
        writeln!(out, "{}\t{}", id, lineage).map_err(|e| Error::io(path, e))?;
    }
    out.flush().map_err(|e| Error::io(path, e))
}
