//! A BED12-style gene model.
//!
//! Coordinates are 0-based and half-open, block starts are relative to the
//! gene start, as in the BED format.

use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

use crate::libs::error::{FioError, Result};
use crate::libs::nt;

/// Which set of intervals a comparison looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Features {
    Exons,
    Cds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub chrom: String,
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub score: i64,
    pub strand: String,
    pub cds_start: usize,
    pub cds_end: usize,
    pub item_rgb: String,
    pub block_sizes: Vec<usize>,
    pub block_starts: Vec<usize>,
    /// attributes carried into GFF3 output
    pub attrs: IndexMap<String, String>,
    /// format-specific extras, e.g. the protein of an Augustus prediction
    pub aux: IndexMap<String, String>,
}

fn parse_num<T: std::str::FromStr>(field: &str, what: &str) -> Result<T> {
    field.trim().parse().map_err(|_| FioError::MalformedFeature {
        line: 0,
        msg: format!("invalid {}: {}", what, field),
    })
}

/// Comma-separated numbers, trailing comma allowed
fn parse_list(field: &str, what: &str) -> Result<Vec<usize>> {
    field
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_num(s, what))
        .collect()
}

impl Gene {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chrom: &str,
        start: usize,
        end: usize,
        name: &str,
        score: i64,
        strand: &str,
        cds_start: usize,
        cds_end: usize,
        item_rgb: &str,
        block_count: usize,
        block_sizes: Vec<usize>,
        block_starts: Vec<usize>,
    ) -> Result<Self> {
        if block_sizes.len() != block_starts.len() || block_sizes.len() != block_count {
            return Err(FioError::MalformedFeature {
                line: 0,
                msg: format!(
                    "{}: block count {} with {} sizes and {} starts",
                    name,
                    block_count,
                    block_sizes.len(),
                    block_starts.len()
                ),
            });
        }
        if start > end {
            return Err(FioError::MalformedFeature {
                line: 0,
                msg: format!("{}: start {} after end {}", name, start, end),
            });
        }

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            name: name.to_string(),
            score,
            strand: strand.to_string(),
            cds_start,
            cds_end,
            item_rgb: item_rgb.to_string(),
            block_sizes,
            block_starts,
            attrs: IndexMap::new(),
            aux: IndexMap::new(),
        })
    }

    /// Parses the 12 columns of a BED12 line
    ///
    /// ```
    /// # use featureio::libs::gene::Gene;
    /// let line = "chr1\t100\t500\tg1\t0\t+\t150\t450\t0\t2\t100,150,\t0,250,";
    /// let fields: Vec<&str> = line.split('\t').collect();
    /// let gene = Gene::from_bed_fields(&fields).unwrap();
    /// assert_eq!(gene.exons(), vec![(100, 200), (350, 500)]);
    /// assert_eq!(gene.cds_exons(), vec![(150, 200), (350, 450)]);
    /// assert_eq!(gene.to_string(), "chr1\t100\t500\tg1\t0\t+\t150\t450\t0\t2\t100,150\t0,250");
    /// ```
    pub fn from_bed_fields(fields: &[&str]) -> Result<Self> {
        if fields.len() != 12 {
            return Err(FioError::MalformedFeature {
                line: 0,
                msg: format!("expected 12 fields, got {}", fields.len()),
            });
        }

        Self::new(
            fields[0],
            parse_num(fields[1], "start")?,
            parse_num(fields[2], "end")?,
            fields[3],
            parse_num(fields[4], "score")?,
            fields[5],
            parse_num(fields[6], "thickStart")?,
            parse_num(fields[7], "thickEnd")?,
            fields[8],
            parse_num(fields[9], "blockCount")?,
            parse_list(fields[10], "blockSizes")?,
            parse_list(fields[11], "blockStarts")?,
        )
    }

    pub fn block_count(&self) -> usize {
        self.block_sizes.len()
    }

    pub fn is_minus(&self) -> bool {
        self.strand == "-"
    }

    /// Absolute exon intervals, in block order
    pub fn exons(&self) -> Vec<(usize, usize)> {
        self.block_starts
            .iter()
            .zip(self.block_sizes.iter())
            .map(|(&st, &sz)| (self.start + st, self.start + st + sz))
            .collect()
    }

    /// Exons clipped to the coding range; non-coding exons are dropped
    pub fn cds_exons(&self) -> Vec<(usize, usize)> {
        self.exons()
            .into_iter()
            .filter_map(|(st, en)| {
                let s = st.max(self.cds_start);
                let e = en.min(self.cds_end);
                (s < e).then_some((s, e))
            })
            .collect()
    }

    pub fn features(&self, which: Features) -> Vec<(usize, usize)> {
        match which {
            Features::Exons => self.exons(),
            Features::Cds => self.cds_exons(),
        }
    }

    pub fn length(&self) -> usize {
        self.block_sizes.iter().sum()
    }

    pub fn cds_length(&self) -> usize {
        self.cds_exons().iter().map(|(s, e)| e - s).sum()
    }

    /// Transcription start, strand aware
    pub fn fivep(&self) -> usize {
        if self.is_minus() {
            self.end
        } else {
            self.start
        }
    }

    pub fn cds_fivep(&self) -> usize {
        if self.is_minus() {
            self.cds_end
        } else {
            self.cds_start
        }
    }

    fn spliced(&self, seq: &[u8], parts: &[(usize, usize)]) -> Result<Vec<u8>> {
        let mut out = vec![];
        for &(s, e) in parts.iter().sorted() {
            let part = seq.get(s..e).ok_or_else(|| FioError::OutOfRange {
                name: self.chrom.clone(),
                start: s,
                end: e,
                length: seq.len(),
            })?;
            out.extend_from_slice(part);
        }

        if self.is_minus() {
            out = nt::reverse_complement(&out);
        }
        Ok(out)
    }

    /// Spliced exon sequence from the chromosome sequence `seq`, 5' to 3'
    pub fn exon_seq(&self, seq: &[u8]) -> Result<Vec<u8>> {
        self.spliced(seq, &self.exons())
    }

    pub fn cds_seq(&self, seq: &[u8]) -> Result<Vec<u8>> {
        self.spliced(seq, &self.cds_exons())
    }

    /// Same chromosome and strand, and the loci intersect
    pub fn locus_overlap(&self, other: &Gene) -> bool {
        self.chrom == other.chrom
            && self.strand == other.strand
            && self.start < other.end
            && other.start < self.end
    }

    /// Overlapping loci sharing at least one identical feature
    pub fn is_isoform(&self, other: &Gene, which: Features) -> bool {
        if !self.locus_overlap(other) {
            return false;
        }
        self.features(which)
            .iter()
            .cartesian_product(other.features(which).iter())
            .any(|(a, b)| a == b)
    }

    pub fn identical(&self, other: &Gene, which: Features) -> bool {
        let mut mine = self.features(which);
        let mut theirs = other.features(which);
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }

    pub fn overlap(&self, other: &Gene, which: Features) -> bool {
        if !self.locus_overlap(other) {
            return false;
        }
        self.features(which)
            .iter()
            .cartesian_product(other.features(which).iter())
            .any(|(a, b)| a.0 < b.1 && b.0 < a.1)
    }

    /// Total bases shared between the two feature sets
    pub fn overlap_length(&self, other: &Gene, which: Features) -> usize {
        if !self.locus_overlap(other) {
            return 0;
        }
        self.features(which)
            .iter()
            .cartesian_product(other.features(which).iter())
            .map(|(a, b)| a.1.min(b.1).saturating_sub(a.0.max(b.0)))
            .sum()
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.end,
            self.name,
            self.score,
            self.strand,
            self.cds_start,
            self.cds_end,
            self.item_rgb,
            self.block_count(),
            self.block_sizes.iter().join(","),
            self.block_starts.iter().join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bed(line: &str) -> Gene {
        let fields: Vec<&str> = line.split('\t').collect();
        Gene::from_bed_fields(&fields).unwrap()
    }

    #[test]
    fn test_lengths_and_fivep() {
        let g = bed("chr1\t10\t40\tg1\t0\t-\t15\t35\t0\t2\t10,10,\t0,20,");
        assert_eq!(g.exons(), vec![(10, 20), (30, 40)]);
        assert_eq!(g.cds_exons(), vec![(15, 20), (30, 35)]);
        assert_eq!(g.length(), 20);
        assert_eq!(g.cds_length(), 10);
        assert_eq!(g.fivep(), 40);
        assert_eq!(g.cds_fivep(), 35);
        assert_eq!(g.block_count(), 2);
    }

    #[test]
    fn test_noncoding() {
        // thickStart == thickEnd
        let g = bed("chr1\t10\t40\tg1\t0\t+\t40\t40\t0\t2\t10,10,\t0,20,");
        assert!(g.cds_exons().is_empty());
        assert_eq!(g.cds_length(), 0);
        assert_eq!(g.fivep(), 10);

        // exon touching the coding start contributes nothing
        let g = bed("chr1\t10\t40\tg1\t0\t+\t20\t40\t0\t2\t10,10,\t0,20,");
        assert_eq!(g.cds_exons(), vec![(30, 40)]);
    }

    #[test]
    fn test_block_mismatch() {
        let fields: Vec<&str> = "chr1\t10\t40\tg1\t0\t+\t10\t40\t0\t3\t10,10,\t0,20,"
            .split('\t')
            .collect();
        assert!(Gene::from_bed_fields(&fields).is_err());

        let fields: Vec<&str> = "chr1\t10\t40".split('\t').collect();
        assert!(Gene::from_bed_fields(&fields).is_err());

        let fields: Vec<&str> = "chr1\tten\t40\tg1\t0\t+\t10\t40\t0\t1\t30,\t0,"
            .split('\t')
            .collect();
        assert!(Gene::from_bed_fields(&fields).is_err());
    }

    #[test]
    fn test_sequences() {
        //         0123456789012345
        let seq = b"AAAACCCCGGGGTTTT";
        let plus = bed("chr1\t2\t14\tg1\t0\t+\t3\t13\t0\t2\t4,4,\t0,8,");
        assert_eq!(plus.exon_seq(seq).unwrap(), b"AACCGGTT");
        assert_eq!(plus.cds_seq(seq).unwrap(), b"ACCGGT");

        let mut minus = plus.clone();
        minus.strand = "-".to_string();
        assert_eq!(minus.exon_seq(seq).unwrap(), b"AACCGGTT");
        assert_eq!(minus.cds_seq(seq).unwrap(), b"ACCGGT");

        let minus = bed("chr1\t0\t8\tg2\t0\t-\t0\t8\t0\t1\t8,\t0,");
        assert_eq!(minus.exon_seq(seq).unwrap(), b"GGGGTTTT");

        assert!(plus.exon_seq(b"ACGT").is_err());
    }

    #[test]
    fn test_comparisons() {
        let a = bed("chr1\t100\t400\ta\t0\t+\t100\t400\t0\t2\t100,100,\t0,200,");
        let b = bed("chr1\t100\t500\tb\t0\t+\t100\t500\t0\t2\t100,50,\t0,350,");
        let c = bed("chr1\t350\t500\tc\t0\t+\t350\t500\t0\t1\t50,\t100,");
        let other_strand = bed("chr1\t100\t400\td\t0\t-\t100\t400\t0\t2\t100,100,\t0,200,");

        assert!(a.locus_overlap(&b));
        assert!(a.is_isoform(&b, Features::Exons));
        assert!(!a.is_isoform(&c, Features::Exons));
        assert!(!a.is_isoform(&other_strand, Features::Exons));

        assert!(a.identical(&other_strand, Features::Exons));
        assert!(!a.identical(&b, Features::Exons));

        // the loci overlap, (300, 400) and (450, 500) do not
        assert!(a.locus_overlap(&c));
        assert!(!a.overlap(&c, Features::Exons));
        assert!(b.overlap(&c, Features::Cds));

        assert_eq!(a.overlap_length(&b, Features::Exons), 100);
        assert_eq!(b.overlap_length(&c, Features::Exons), 50);
        assert_eq!(a.overlap_length(&other_strand, Features::Exons), 0);
    }

    #[test]
    fn test_clone_and_modify() {
        let a = bed("chr1\t100\t400\ta\t0\t+\t100\t400\t0\t1\t300,\t0,");
        let b = Gene {
            name: "b".to_string(),
            ..a.clone()
        };
        assert_eq!(b.name, "b");
        assert_eq!(a.name, "a");
        assert!(a.identical(&b, Features::Exons));
    }
}
