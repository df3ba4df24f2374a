//! Nucleotide helpers.

const CHARS: &[u8; 32] = b"acgtumrwsykvhdbnACGTUMRWSYKVHDBN";
const COMPL: &[u8; 32] = b"tgcaakywsrmbdhvnTGCAAKYWSRMBDHVN";

// 256-entry lookup, identity for anything outside of IUPAC
const COMPLEMENT: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    let mut j = 0;
    while j < CHARS.len() {
        table[CHARS[j] as usize] = COMPL[j];
        j += 1;
    }
    table
};

/// IUPAC complement of a single base, case preserved.
///
/// ```
/// use featureio::libs::nt::complement;
/// assert_eq!(complement(b'A'), b'T');
/// assert_eq!(complement(b'u'), b'a');
/// assert_eq!(complement(b'R'), b'Y');
/// assert_eq!(complement(b'-'), b'-');
/// ```
#[inline]
pub fn complement(b: u8) -> u8 {
    COMPLEMENT[b as usize]
}

/// ```
/// use featureio::libs::nt::reverse_complement;
/// assert_eq!(reverse_complement(b"AACGtn"), b"naCGTT".to_vec());
/// assert!(reverse_complement(b"").is_empty());
/// ```
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

#[inline]
pub fn is_n(b: u8) -> bool {
    matches!(b, b'N' | b'n')
}

/// G, C and the strong ambiguity code S
#[inline]
pub fn is_gc(b: u8) -> bool {
    matches!(b, b'G' | b'g' | b'C' | b'c' | b'S' | b's')
}

/// Returns `(gc, non_n)` base counts.
pub fn gc_counts(seq: &[u8]) -> (usize, usize) {
    seq.iter().fold((0, 0), |(gc, acgt), &b| {
        if is_n(b) {
            (gc, acgt)
        } else if is_gc(b) {
            (gc + 1, acgt + 1)
        } else {
            (gc, acgt + 1)
        }
    })
}

/// Fraction of G+C over all bases that are not N.
///
/// ```
/// use featureio::libs::nt::gc_content;
/// assert_eq!(gc_content(b"GCAT"), 0.5);
/// assert_eq!(gc_content(b"GGNN"), 1.0);
/// assert_eq!(gc_content(b"NNNN"), 0.0);
/// ```
pub fn gc_content(seq: &[u8]) -> f64 {
    let (gc, non_n) = gc_counts(seq);
    if non_n == 0 {
        0.0
    } else {
        gc as f64 / non_n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_is_involution() {
        for &b in CHARS.iter() {
            // U complements to A, which goes back to T
            let expected = match b {
                b'u' => b't',
                b'U' => b'T',
                _ => b,
            };
            assert_eq!(complement(complement(b)), expected, "{}", b as char);
        }
    }

    #[test]
    fn test_gc_counts() {
        assert_eq!(gc_counts(b"ACGTNnSs"), (4, 6));
        assert_eq!(gc_counts(b""), (0, 0));
    }
}
