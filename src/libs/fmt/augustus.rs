//! AUGUSTUS gene predictions in, AUGUSTUS hints out.

use std::io::{BufRead, Write};

use super::GeneWriter;
use crate::libs::error::{FioError, Result};
use crate::libs::gene::Gene;

// A transcript whose features are still being collected
#[derive(Debug, Default)]
struct Transcript {
    lineno: usize,
    chrom: String,
    start: usize,
    end: usize,
    strand: String,
    name: String,
    gene_id: Option<String>,
    exons: Vec<(usize, usize)>,
    cds: Vec<(usize, usize)>,
    protein: Option<String>,
}

impl Transcript {
    fn into_gene(self) -> Result<Gene> {
        let mut blocks = if self.exons.is_empty() {
            self.cds.clone()
        } else {
            self.exons.clone()
        };
        if blocks.is_empty() {
            blocks.push((self.start, self.end));
        }
        blocks.sort_unstable();

        let (cds_start, cds_end) = if self.cds.is_empty() {
            (self.start, self.start)
        } else {
            (
                self.cds.iter().map(|c| c.0).min().unwrap_or(self.start),
                self.cds.iter().map(|c| c.1).max().unwrap_or(self.start),
            )
        };

        let outside = blocks.iter().any(|&(s, e)| s < self.start || e > self.end);
        if outside {
            return Err(FioError::MalformedFeature {
                line: self.lineno,
                msg: format!("feature outside of transcript {}", self.name),
            });
        }

        let mut gene = Gene::new(
            &self.chrom,
            self.start,
            self.end,
            &self.name,
            0,
            &self.strand,
            cds_start,
            cds_end,
            "0",
            blocks.len(),
            blocks.iter().map(|(s, e)| e - s).collect(),
            blocks.iter().map(|(s, _)| s - self.start).collect(),
        )?;

        if let Some(gene_id) = self.gene_id {
            gene.aux.insert("gene_id".to_string(), gene_id);
        }
        if let Some(protein) = self.protein {
            gene.aux.insert("protein".to_string(), protein);
        }
        Ok(gene)
    }
}

/// Value of a GTF attribute such as `gene_id "g1";`
fn gtf_attr(attrs: &str, key: &str) -> Option<String> {
    attrs.split(';').find_map(|kv| {
        let mut parts = kv.trim().splitn(2, char::is_whitespace);
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == key => Some(v.trim().trim_matches('"').to_string()),
            _ => None,
        }
    })
}

// GTF is 1-based and inclusive
fn gtf_interval(start: &str, end: &str, lineno: usize) -> Result<(usize, usize)> {
    let parse = |s: &str| {
        s.parse::<usize>().map_err(|_| FioError::MalformedFeature {
            line: lineno,
            msg: format!("invalid coordinate: {}", s),
        })
    };
    let (s, e) = (parse(start)?, parse(end)?);
    if s == 0 || s > e.saturating_add(1) {
        return Err(FioError::MalformedFeature {
            line: lineno,
            msg: format!("invalid interval: {}-{}", start, end),
        });
    }
    Ok((s - 1, e))
}

/// Transcripts of an AUGUSTUS GTF, with the predicted protein when present.
///
/// Everything before the first `# start gene` comment is ignored. A
/// transcript is complete once its protein sequence closes, at
/// `# end gene`, or when the next transcript starts.
///
/// ```
/// # use featureio::libs::fmt::AugustusGtfReader;
/// let gtf = "\
/// ## start gene g1
/// chr1\tAUGUSTUS\tgene\t11\t100\t0.9\t+\t.\tg1
/// chr1\tAUGUSTUS\ttranscript\t11\t100\t0.9\t+\t.\tg1.t1
/// chr1\tAUGUSTUS\tCDS\t11\t40\t1\t+\t0\ttranscript_id \"g1.t1\"; gene_id \"g1\";
/// chr1\tAUGUSTUS\tCDS\t71\t100\t1\t+\t0\ttranscript_id \"g1.t1\"; gene_id \"g1\";
/// ## protein sequence = [MKVL
/// ## ACDE]
/// ## end gene g1
/// ";
/// let genes: Vec<_> = AugustusGtfReader::new(gtf.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(genes.len(), 1);
/// assert_eq!(genes[0].to_string(), "chr1\t10\t100\tg1.t1\t0\t+\t10\t100\t0\t2\t30,30\t0,60");
/// assert_eq!(genes[0].aux["protein"], "MKVLACDE");
/// assert_eq!(genes[0].aux["gene_id"], "g1");
/// ```
pub struct AugustusGtfReader<R> {
    lines: std::io::Lines<R>,
    lineno: usize,
    started: bool,
    current: Option<Transcript>,
    // inside `# protein sequence = [...]`
    in_protein: bool,
}

impl<R: BufRead> AugustusGtfReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            lineno: 0,
            started: false,
            current: None,
            in_protein: false,
        }
    }

    fn finish(&mut self) -> Option<Result<Gene>> {
        self.in_protein = false;
        self.current.take().map(|t| t.into_gene())
    }

    // Returns a finished transcript, if this line completes one
    fn process(&mut self, line: &str) -> Result<Option<Gene>> {
        if !self.started {
            if line.starts_with("# start gene") {
                self.started = true;
            }
            return Ok(None);
        }

        if let Some(comment) = line.strip_prefix('#') {
            let Some(transcript) = self.current.as_mut() else {
                return Ok(None);
            };

            if comment.starts_with(" end gene") {
                return self.finish().transpose();
            }

            let text = if let Some(pos) = comment.find("protein sequence = [") {
                self.in_protein = true;
                &comment[pos + "protein sequence = [".len()..]
            } else if self.in_protein {
                comment.trim_start()
            } else {
                return Ok(None);
            };

            let (text, closed) = match text.find(']') {
                Some(pos) => (&text[..pos], true),
                None => (text, false),
            };
            transcript
                .protein
                .get_or_insert_with(String::new)
                .push_str(text.trim());

            if closed {
                return self.finish().transpose();
            }
            return Ok(None);
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            return Ok(None);
        }
        let (start, end) = match fields[2] {
            "transcript" | "exon" | "CDS" => gtf_interval(fields[3], fields[4], self.lineno)?,
            _ => return Ok(None),
        };

        match fields[2] {
            "transcript" => {
                let previous = self.finish().transpose()?;
                self.current = Some(Transcript {
                    lineno: self.lineno,
                    chrom: fields[0].to_string(),
                    start,
                    end,
                    strand: fields[6].to_string(),
                    name: fields[8].trim().to_string(),
                    ..Default::default()
                });
                Ok(previous)
            }
            feature => {
                if let Some(transcript) = self.current.as_mut() {
                    if transcript.gene_id.is_none() {
                        transcript.gene_id = gtf_attr(fields[8], "gene_id");
                    }
                    if feature == "exon" {
                        transcript.exons.push((start, end));
                    } else {
                        transcript.cds.push((start, end));
                    }
                }
                Ok(None)
            }
        }
    }
}

impl<R: BufRead> Iterator for AugustusGtfReader<R> {
    type Item = Result<Gene>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            self.lineno += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            match self.process(line.trim_end()) {
                Ok(Some(gene)) => return Some(Ok(gene)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        // a truncated file may leave the last transcript open
        self.finish()
    }
}

/// Exon hints for AUGUSTUS, one GFF line per exon.
///
/// ```
/// # use featureio::libs::fmt::{ExonHintWriter, GeneWriter};
/// # use featureio::libs::gene::Gene;
/// let fields: Vec<&str> = "chr1\t10\t40\tg1\t0\t-\t15\t35\t0\t2\t10,10,\t0,20,".split('\t').collect();
/// let gene = Gene::from_bed_fields(&fields).unwrap();
/// let mut out = vec![];
/// ExonHintWriter::default().write_gene(&mut out, &gene).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "chr1\tfeatureio\texon\t16\t20\t.\t-\t.\tgrp=g1;pri=4;src=E\n\
///      chr1\tfeatureio\texon\t31\t35\t.\t-\t.\tgrp=g1;pri=4;src=E\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ExonHintWriter {
    /// hint coding parts only
    pub cds_exons: bool,
    pub feature_type: String,
    pub source: String,
    pub augustus_source: String,
    pub priority: u32,
}

impl Default for ExonHintWriter {
    fn default() -> Self {
        Self {
            cds_exons: true,
            feature_type: "exon".to_string(),
            source: "featureio".to_string(),
            augustus_source: "E".to_string(),
            priority: 4,
        }
    }
}

impl GeneWriter for ExonHintWriter {
    fn write_gene(&mut self, w: &mut dyn Write, gene: &Gene) -> Result<()> {
        let parts = if self.cds_exons {
            gene.cds_exons()
        } else {
            gene.exons()
        };

        for (start, end) in parts {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t.\t{}\t.\tgrp={};pri={};src={}",
                gene.chrom,
                self.source,
                self.feature_type,
                start + 1,
                end,
                gene.strand,
                gene.name,
                self.priority,
                self.augustus_source
            )?;
        }
        Ok(())
    }
}
