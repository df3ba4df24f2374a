use std::io::{BufRead, Write};

use super::GeneWriter;
use crate::libs::error::{FioError, Result};
use crate::libs::gene::Gene;

/// BED12 lines; `#` comments and blank lines are skipped
pub struct Bed12Reader<R> {
    lines: std::io::Lines<R>,
    lineno: usize,
}

impl<R: BufRead> Bed12Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            lineno: 0,
        }
    }
}

impl<R: BufRead> Iterator for Bed12Reader<R> {
    type Item = Result<Gene>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.lineno += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').collect();
            if fields.len() != 12 {
                return Some(Err(FioError::MalformedFeature {
                    line: self.lineno,
                    msg: format!("Incorrect number of fields ({}):\n{}", fields.len(), line),
                }));
            }

            let lineno = self.lineno;
            return Some(Gene::from_bed_fields(&fields).map_err(|e| match e {
                FioError::MalformedFeature { msg, .. } => {
                    FioError::MalformedFeature { line: lineno, msg }
                }
                e => e,
            }));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bed12Writer;

impl GeneWriter for Bed12Writer {
    fn write_gene(&mut self, w: &mut dyn Write, gene: &Gene) -> Result<()> {
        writeln!(w, "{}", gene)?;
        Ok(())
    }
}
