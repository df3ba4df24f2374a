use indexmap::IndexMap;
use itertools::Itertools;
use std::io::Write;

use super::GeneWriter;
use crate::libs::error::Result;
use crate::libs::gene::Gene;

/// GFF3 with a gene, mRNA, exon and CDS hierarchy per gene.
///
/// Coordinates are written 1-based and inclusive.
///
/// ```
/// # use featureio::libs::fmt::{Gff3Writer, GeneWriter};
/// # use featureio::libs::gene::Gene;
/// let fields: Vec<&str> = "chr1\t0\t20\tg1\t0\t+\t2\t20\t0\t2\t5,10,\t0,10,".split('\t').collect();
/// let gene = Gene::from_bed_fields(&fields).unwrap();
/// let mut out = vec![];
/// Gff3Writer::default().write_file(&mut out, &[gene]).unwrap();
/// let gff = String::from_utf8(out).unwrap();
/// let lines: Vec<&str> = gff.lines().collect();
/// assert_eq!(lines[0], "##gff-version 3");
/// assert_eq!(lines[1], "chr1\tGFF3Conv\tgene\t1\t20\t.\t+\t.\tName=g1;ID=g1");
/// assert_eq!(lines[2], "chr1\tGFF3Conv\tmRNA\t1\t20\t.\t+\t.\tParent=g1;ID=g1.mRNA.1");
/// assert_eq!(lines[5], "chr1\tGFF3Conv\tCDS\t3\t5\t.\t+\t0\tParent=g1.mRNA.1;ID=g1.CDS.0");
/// assert_eq!(lines[6], "chr1\tGFF3Conv\tCDS\t11\t20\t.\t+\t0\tParent=g1.mRNA.1;ID=g1.CDS.1");
/// ```
#[derive(Debug, Clone)]
pub struct Gff3Writer {
    pub source: String,
}

impl Default for Gff3Writer {
    fn default() -> Self {
        Self {
            source: "GFF3Conv".to_string(),
        }
    }
}

impl Gff3Writer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
        }
    }

    fn write_feature(
        &self,
        w: &mut dyn Write,
        gene: &Gene,
        ftype: &str,
        (start, end): (usize, usize),
        phase: Option<usize>,
        attrs: &IndexMap<String, String>,
    ) -> Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t.\t{}\t{}\t{}",
            gene.chrom,
            self.source,
            ftype,
            start + 1,
            end,
            gene.strand,
            phase.map_or(".".to_string(), |p| p.to_string()),
            attrs.iter().map(|(k, v)| format!("{}={}", k, v)).join(";")
        )?;
        Ok(())
    }

    fn child_attrs(parent: &str, id: String) -> IndexMap<String, String> {
        let mut attrs = IndexMap::new();
        attrs.insert("Parent".to_string(), parent.to_string());
        attrs.insert("ID".to_string(), id);
        attrs
    }
}

/// Phase of the next CDS part given the current part's length and phase
fn next_phase(len: usize, phase: usize) -> usize {
    (3 - (len + 3 - phase) % 3) % 3
}

impl GeneWriter for Gff3Writer {
    fn write_header(&mut self, w: &mut dyn Write) -> Result<()> {
        writeln!(w, "##gff-version 3")?;
        Ok(())
    }

    fn write_gene(&mut self, w: &mut dyn Write, gene: &Gene) -> Result<()> {
        let locus = (gene.start, gene.end);

        let mut attrs = gene.attrs.clone();
        attrs.insert("Name".to_string(), gene.name.clone());
        attrs.insert("ID".to_string(), gene.name.clone());
        self.write_feature(w, gene, "gene", locus, None, &attrs)?;

        let mrna_id = format!("{}.mRNA.1", gene.name);
        let attrs = Self::child_attrs(&gene.name, mrna_id.clone());
        self.write_feature(w, gene, "mRNA", locus, None, &attrs)?;

        for (n, exon) in gene.exons().into_iter().enumerate() {
            let attrs = Self::child_attrs(&mrna_id, format!("{}.exon.{}", gene.name, n));
            self.write_feature(w, gene, "exon", exon, None, &attrs)?;
        }

        let mut cds = gene.cds_exons();
        cds.sort_unstable();
        if gene.is_minus() {
            cds.reverse();
        }
        let mut phase = 0;
        for (n, part) in cds.into_iter().enumerate() {
            let attrs = Self::child_attrs(&mrna_id, format!("{}.CDS.{}", gene.name, n));
            self.write_feature(w, gene, "CDS", part, Some(phase), &attrs)?;
            phase = next_phase(part.1 - part.0, phase);
        }

        Ok(())
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
    fn test_next_phase() {
        assert_eq!(next_phase(3, 0), 0);
        assert_eq!(next_phase(4, 0), 2);
        assert_eq!(next_phase(5, 0), 1);
        assert_eq!(next_phase(4, 2), 1);
        assert_eq!(next_phase(1, 2), 1);
    }

    #[test]
    fn test_minus_strand_phases() {
        let mut gene = bed("chr2\t100\t200\ttx\t0\t-\t100\t200\t0\t3\t10,20,10,\t0,40,90,");
        gene.attrs.insert("Note".to_string(), "minus".to_string());

        let mut out = vec![];
        let mut writer = Gff3Writer::new("test");
        writer.write_gene(&mut out, &gene).unwrap();
        let gff = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = gff.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(
            lines[0],
            "chr2\ttest\tgene\t101\t200\t.\t-\t.\tNote=minus;Name=tx;ID=tx"
        );
        assert_eq!(
            lines[2],
            "chr2\ttest\texon\t101\t110\t.\t-\t.\tParent=tx.mRNA.1;ID=tx.exon.0"
        );
        // 5' most part first on the minus strand
        assert_eq!(
            lines[5],
            "chr2\ttest\tCDS\t191\t200\t.\t-\t0\tParent=tx.mRNA.1;ID=tx.CDS.0"
        );
        assert_eq!(
            lines[6],
            "chr2\ttest\tCDS\t141\t160\t.\t-\t2\tParent=tx.mRNA.1;ID=tx.CDS.1"
        );
        assert_eq!(
            lines[7],
            "chr2\ttest\tCDS\t101\t110\t.\t-\t0\tParent=tx.mRNA.1;ID=tx.CDS.2"
        );
    }

    #[test]
    fn test_noncoding_has_no_cds() {
        let gene = bed("chr1\t0\t10\tnc\t0\t+\t0\t0\t0\t1\t10,\t0,");
        let mut out = vec![];
        Gff3Writer::default().write_gene(&mut out, &gene).unwrap();
        let gff = String::from_utf8(out).unwrap();
        assert_eq!(gff.lines().count(), 3);
        assert!(!gff.contains("\tCDS\t"));
    }
}
