use log::debug;
use std::io::BufRead;

use crate::libs::error::{FioError, Result};
use crate::libs::gene::Gene;
use crate::libs::psl::Psl;

/// Lines of the psLayout header written by BLAT
const BLAT_HEADER_LINES: usize = 5;

/// PSL records converted to genes on the target side
pub struct PslReader<R> {
    lines: std::io::Lines<R>,
    lineno: usize,
    skip: usize,
}

impl<R: BufRead> PslReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            lineno: 0,
            skip: 0,
        }
    }

    /// BLAT output, starting with a psLayout header
    pub fn blat(reader: R) -> Self {
        Self {
            skip: BLAT_HEADER_LINES,
            ..Self::new(reader)
        }
    }
}

impl<R: BufRead> Iterator for PslReader<R> {
    type Item = Result<Gene>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.lineno += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if self.lineno <= self.skip || line.trim().is_empty() {
                continue;
            }

            let lineno = self.lineno;
            let malformed = |e: anyhow::Error| FioError::MalformedFeature {
                line: lineno,
                msg: e.to_string(),
            };
            let gene = line
                .parse::<Psl>()
                .and_then(|psl| {
                    debug!(
                        "{} on {}: score {} identity {:.3} query cover {:.3} target cover {:.3}",
                        psl.q_name,
                        psl.t_name,
                        psl.score(),
                        psl.calc_ident(),
                        psl.calc_q_cover(),
                        psl.calc_t_cover()
                    );
                    psl.to_gene()
                })
                .map_err(malformed);
            return Some(gene);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLAT: &str = "psLayout version 3

match\tmis- \trep. \tN's\tQ gap\tQ gap\tT gap\tT gap\tstrand\tQ        \tQ   \tQ    \tQ  \tT        \tT   \tT    \tT  \tblock\tblockSizes \tqStarts\t tStarts
     \tmatch\tmatch\t   \tcount\tbases\tcount\tbases\t      \tname     \tsize\tstart\tend\tname     \tsize\tstart\tend\tcount
---------------------------------------------------------------------------------------------------------------------------------------------------------------
30\t0\t0\t0\t0\t0\t1\t70\t+\tread1\t30\t0\t30\tchr2\t5000\t1000\t1100\t2\t10,20,\t0,10,\t1000,1080,
";

    #[test]
    fn test_blat_header() {
        let genes: Vec<Gene> = PslReader::blat(BLAT.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(genes.len(), 1);
        assert_eq!(
            genes[0].to_string(),
            "chr2\t1000\t1100\tread1\t30\t+\t0\t0\t0\t2\t10,20\t0,80"
        );
        assert_eq!(genes[0].length(), 30);
    }

    #[test]
    fn test_plain_psl_rejects_header() {
        let mut reader = PslReader::new(BLAT.as_bytes());
        match reader.next() {
            Some(Err(FioError::MalformedFeature { line, .. })) => assert_eq!(line, 1),
            _ => panic!("header should not parse as PSL"),
        }
    }
}
