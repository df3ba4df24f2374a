//! Readers and writers of gene feature formats.

pub mod augustus;
pub mod bed;
pub mod gff3;
pub mod psl;

use indexmap::IndexMap;
use std::io::{BufRead, Write};

use crate::libs::error::{FioError, Result};
use crate::libs::gene::Gene;

pub use augustus::{AugustusGtfReader, ExonHintWriter};
pub use bed::{Bed12Reader, Bed12Writer};
pub use gff3::Gff3Writer;
pub use psl::PslReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Bed12,
    Psl,
    BlatPsl,
    AugustusGtf,
}

impl InputFormat {
    pub const NAMES: [&'static str; 4] = ["bed12", "psl", "blatpsl", "augustusgtf"];
}

impl std::str::FromStr for InputFormat {
    type Err = FioError;

    /// ```
    /// # use featureio::libs::fmt::InputFormat;
    /// assert_eq!("psl".parse::<InputFormat>().unwrap(), InputFormat::Psl);
    /// let err = "gff3".parse::<InputFormat>().unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Unknown format gff3. Should be one of bed12,psl,blatpsl,augustusgtf"
    /// );
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bed12" => Ok(InputFormat::Bed12),
            "psl" => Ok(InputFormat::Psl),
            "blatpsl" => Ok(InputFormat::BlatPsl),
            "augustusgtf" => Ok(InputFormat::AugustusGtf),
            _ => Err(FioError::UnknownFormat {
                format: s.to_string(),
                valid: Self::NAMES.join(","),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Bed12,
    AugustusExonHints,
    Gff3,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["bed12", "augustus_exon_hints", "gff3"];
}

impl std::str::FromStr for OutputFormat {
    type Err = FioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bed12" => Ok(OutputFormat::Bed12),
            "augustus_exon_hints" => Ok(OutputFormat::AugustusExonHints),
            "gff3" => Ok(OutputFormat::Gff3),
            _ => Err(FioError::UnknownFormat {
                format: s.to_string(),
                valid: Self::NAMES.join(","),
            }),
        }
    }
}

/// Iterates the genes of `reader` in the given format.
pub fn parse<'a, R: BufRead + 'a>(
    reader: R,
    format: InputFormat,
) -> Box<dyn Iterator<Item = Result<Gene>> + 'a> {
    match format {
        InputFormat::Bed12 => Box::new(Bed12Reader::new(reader)),
        InputFormat::Psl => Box::new(PslReader::new(reader)),
        InputFormat::BlatPsl => Box::new(PslReader::blat(reader)),
        InputFormat::AugustusGtf => Box::new(AugustusGtfReader::new(reader)),
    }
}

/// Genes keyed by name. A later gene replaces an earlier one of the same name.
pub fn to_map<I: IntoIterator<Item = Gene>>(genes: I) -> IndexMap<String, Gene> {
    genes.into_iter().map(|g| (g.name.clone(), g)).collect()
}

/// Shared shape of all gene writers
pub trait GeneWriter {
    fn write_header(&mut self, _w: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn write_gene(&mut self, w: &mut dyn Write, gene: &Gene) -> Result<()>;

    fn write_footer(&mut self, _w: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    /// Header, every gene, footer. Returns the number of genes written.
    fn write_file(&mut self, w: &mut dyn Write, genes: &[Gene]) -> Result<usize> {
        self.write_header(w)?;
        for gene in genes {
            self.write_gene(w, gene)?;
        }
        self.write_footer(w)?;
        Ok(genes.len())
    }
}

/// A writer for `format` with default settings
pub fn writer_for(format: OutputFormat) -> Box<dyn GeneWriter> {
    match format {
        OutputFormat::Bed12 => Box::new(Bed12Writer),
        OutputFormat::AugustusExonHints => Box::new(ExonHintWriter::default()),
        OutputFormat::Gff3 => Box::new(Gff3Writer::default()),
    }
}

/// Writes all `genes` in the given format with default writer settings.
pub fn write(genes: &[Gene], w: &mut dyn Write, format: OutputFormat) -> Result<usize> {
    writer_for(format).write_file(w, genes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        for name in InputFormat::NAMES {
            assert!(name.parse::<InputFormat>().is_ok());
        }
        for name in OutputFormat::NAMES {
            assert!(name.parse::<OutputFormat>().is_ok());
        }
        let err = "bed6".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().starts_with("Unknown format bed6."));
    }

    #[test]
    fn test_parse_and_write_bed12() {
        let input = "# comment\nchr1\t10\t40\tg1\t0\t+\t15\t35\t0\t2\t10,10,\t0,20,\n\nchr1\t50\t60\tg2\t0\t-\t50\t50\t0\t1\t10,\t0,\n";
        let genes: Vec<Gene> = parse(input.as_bytes(), InputFormat::Bed12)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(genes.len(), 2);

        let mut out = vec![];
        let count = write(&genes, &mut out, OutputFormat::Bed12).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "chr1\t10\t40\tg1\t0\t+\t15\t35\t0\t2\t10,10\t0,20\nchr1\t50\t60\tg2\t0\t-\t50\t50\t0\t1\t10\t0\n"
        );
    }

    #[test]
    fn test_to_map() {
        let input = "chr1\t10\t40\tg1\t0\t+\t15\t35\t0\t1\t30,\t0,\nchr2\t10\t40\tg1\t0\t+\t15\t35\t0\t1\t30,\t0,\nchr1\t50\t60\tg2\t0\t-\t50\t50\t0\t1\t10,\t0,\n";
        let genes = parse(input.as_bytes(), InputFormat::Bed12)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let map = to_map(genes);
        assert_eq!(map.len(), 2);
        assert_eq!(map["g1"].chrom, "chr2");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["g1", "g2"]);
    }
}
