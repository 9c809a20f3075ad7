use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{Error, Result};
use crate::types::DNASequence;

/// Minimal FASTA reader that also supports .gz. Multi-line sequences are
/// joined; anything before the first `>` header is ignored.
pub fn read_fasta_records<P: AsRef<Path>>(path: P) -> Result<Vec<DNASequence>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| Error::io(path, e))?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };

    let mut sequences = Vec::new();
    let mut current: Option<DNASequence> = None;

    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                sequences.push(done);
            }
            let id = header.split_whitespace().next().unwrap_or_default();
            current = Some(DNASequence {
                id: id.to_string(),
                header_line: header.to_string(),
                seq: String::new(),
            });
        } else if let Some(record) = current.as_mut() {
            record.seq.push_str(line.trim());
        }
    }
    if let Some(done) = current.take() {
        sequences.push(done);
    }

    Ok(sequences)
}

/// Write records as single-line FASTA.
pub fn write_fasta_records<'a, P, I>(path: P, records: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a DNASequence>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    for record in records {
        writeln!(out, ">{}\n{}", record.id, record.seq).map_err(|e| Error::io(path, e))?;
    }
    out.flush().map_err(|e| Error::io(path, e))
}
