// src/primers.rs

/// Bitmask of the nucleotides an IUPAC code stands for (A=1, C=2, G=4, T/U=8).
/// Unknown symbols match nothing.
const fn iupac_mask(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' | b'U' => 0b1000,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'K' => 0b1100,
        b'M' => 0b0011,
        b'B' => 0b1110,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'V' => 0b0111,
        b'N' => 0b1111,
        _ => 0,
    }
}

/// Two symbols match when the sets of bases they encode overlap.
pub const fn bases_match(a: u8, b: u8) -> bool {
    iupac_mask(a) & iupac_mask(b) != 0
}

fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        // S, W and N are their own complements
        other => other,
    }
}

/// Reverse complement, ambiguity codes included.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// First position at or after `from` where `primer` matches `seq` exactly
/// (modulo IUPAC ambiguity).
pub fn find_primer(seq: &[u8], primer: &[u8], from: usize) -> Option<usize> {
    if primer.is_empty() || seq.len() < primer.len() || from > seq.len() - primer.len() {
        return None;
    }
    (from..=seq.len() - primer.len()).find(|&start| {
        seq[start..start + primer.len()]
            .iter()
            .zip(primer)
            .all(|(&s, &p)| bases_match(s, p))
    })
}

/// Cut `seq` down to the region between the forward primer and the reverse
/// primer site, primers excluded. The reverse primer is accepted either as
/// written on the forward strand or as its reverse complement. Returns `None`
/// when either site is missing.
pub fn extract_amplicon<'a>(seq: &'a str, fwd_primer: &str, rev_primer: &str) -> Option<&'a str> {
    let bytes = seq.as_bytes();
    let fwd = fwd_primer.as_bytes();
    let start = find_primer(bytes, fwd, 0)? + fwd.len();

    let rev = rev_primer.as_bytes();
    let end = find_primer(bytes, rev, start)
        .or_else(|| find_primer(bytes, &reverse_complement(rev), start))?;

    seq.get(start..end)
}
