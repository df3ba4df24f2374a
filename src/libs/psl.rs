//! PSL alignment records, as written by BLAT and pslPretty.

use std::fmt;
use std::io;

use crate::libs::gene::Gene;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Psl {
    pub match_count: u32,
    pub mismatch_count: u32,
    pub rep_match: u32,
    pub n_count: u32,
    pub q_num_insert: u32,
    pub q_base_insert: i32,
    pub t_num_insert: u32,
    pub t_base_insert: i32,
    pub strand: String, // "+", "-", "++", "+-"
    pub q_name: String,
    pub q_size: u32,
    pub q_start: i32,
    pub q_end: i32,
    pub t_name: String,
    pub t_size: u32,
    pub t_start: i32,
    pub t_end: i32,
    pub block_count: u32,
    pub block_sizes: Vec<u32>,
    pub q_starts: Vec<u32>,
    pub t_starts: Vec<u32>,
}

impl Psl {
    pub fn new() -> Self {
        Default::default()
    }

    /// Query strand, the first character of the strand column
    pub fn q_strand(&self) -> char {
        self.strand.chars().next().unwrap_or('+')
    }

    /// Translated alignments have target blocks three times the query size
    pub fn is_protein(&self) -> bool {
        let Some(last) = (self.block_count as usize).checked_sub(1) else {
            return false;
        };
        let (Some(&t_start_last), Some(&size_last)) =
            (self.t_starts.get(last), self.block_sizes.get(last))
        else {
            return false;
        };
        let t_strand = self.strand.chars().nth(1).unwrap_or('+');
        let tail = t_start_last + 3 * size_last;

        match t_strand {
            '+' => self.t_end as u32 == tail,
            '-' => self.t_start as u32 == self.t_size.saturating_sub(tail),
            _ => false,
        }
    }

    /// pslScore from the Kent source
    pub fn score(&self) -> i32 {
        let size_mul = if self.is_protein() { 3 } else { 1 };
        (size_mul * (self.match_count + (self.rep_match >> 1))) as i32
            - (size_mul * self.mismatch_count) as i32
            - self.q_num_insert as i32
            - self.t_num_insert as i32
    }

    pub fn calc_aligned(&self) -> u32 {
        self.match_count + self.mismatch_count + self.rep_match + self.n_count
    }

    pub fn calc_ident(&self) -> f32 {
        let aligned = self.calc_aligned();
        if aligned == 0 {
            0.0
        } else {
            (self.match_count + self.rep_match) as f32 / aligned as f32
        }
    }

    pub fn calc_q_cover(&self) -> f32 {
        if self.q_size == 0 {
            0.0
        } else {
            self.calc_aligned() as f32 / self.q_size as f32
        }
    }

    pub fn calc_t_cover(&self) -> f32 {
        if self.t_size == 0 {
            0.0
        } else {
            self.calc_aligned() as f32 / self.t_size as f32
        }
    }

    /// The target side of the alignment as a gene model.
    ///
    /// The query becomes the name, matches the score, and target block
    /// starts are made relative to the target start. No CDS is set.
    ///
    /// ```
    /// # use featureio::libs::psl::Psl;
    /// let line = "59\t13\t0\t0\t2\t3\t1\t1\t+\tquery\t100\t10\t90\ttarget\t200\t50\t130\t2\t40,40,\t10,50,\t50,90,";
    /// let psl: Psl = line.parse().unwrap();
    /// let gene = psl.to_gene().unwrap();
    /// assert_eq!(gene.to_string(), "target\t50\t130\tquery\t59\t+\t0\t0\t0\t2\t40,40\t0,40");
    /// ```
    pub fn to_gene(&self) -> anyhow::Result<Gene> {
        let t_start = u32::try_from(self.t_start)
            .map_err(|_| anyhow::anyhow!("Negative target start in {}", self.q_name))?;
        let block_starts = self
            .t_starts
            .iter()
            .map(|&s| {
                s.checked_sub(t_start).map(|v| v as usize).ok_or_else(|| {
                    anyhow::anyhow!("Block start {} before target start {}", s, t_start)
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let gene = Gene::new(
            &self.t_name,
            t_start as usize,
            self.t_end.max(0) as usize,
            &self.q_name,
            self.match_count as i64,
            &self.q_strand().to_string(),
            0,
            0,
            "0",
            self.block_count as usize,
            self.block_sizes.iter().map(|&s| s as usize).collect(),
            block_starts,
        )?;
        Ok(gene)
    }
}

impl std::str::FromStr for Psl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() < 21 {
            return Err(anyhow::anyhow!(
                "Invalid PSL line: {} columns instead of 21",
                fields.len()
            ));
        }

        let parse_u32 = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| anyhow::anyhow!("Invalid u32: {}", s))
        };
        let parse_i32 = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| anyhow::anyhow!("Invalid i32: {}", s))
        };
        let parse_vec = |s: &str| -> anyhow::Result<Vec<u32>> {
            s.split(',')
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.parse::<u32>()
                        .map_err(|_| anyhow::anyhow!("Invalid array val: {}", v))
                })
                .collect()
        };

        let psl = Psl {
            match_count: parse_u32(fields[0])?,
            mismatch_count: parse_u32(fields[1])?,
            rep_match: parse_u32(fields[2])?,
            n_count: parse_u32(fields[3])?,
            q_num_insert: parse_u32(fields[4])?,
            q_base_insert: parse_i32(fields[5])?,
            t_num_insert: parse_u32(fields[6])?,
            t_base_insert: parse_i32(fields[7])?,
            strand: fields[8].to_string(),
            q_name: fields[9].to_string(),
            q_size: parse_u32(fields[10])?,
            q_start: parse_i32(fields[11])?,
            q_end: parse_i32(fields[12])?,
            t_name: fields[13].to_string(),
            t_size: parse_u32(fields[14])?,
            t_start: parse_i32(fields[15])?,
            t_end: parse_i32(fields[16])?,
            block_count: parse_u32(fields[17])?,
            block_sizes: parse_vec(fields[18])?,
            q_starts: parse_vec(fields[19])?,
            t_starts: parse_vec(fields[20])?,
        };

        let n = psl.block_count as usize;
        if psl.block_sizes.len() != n || psl.q_starts.len() != n || psl.t_starts.len() != n {
            return Err(anyhow::anyhow!(
                "Invalid PSL line: blockCount {} does not match the block lists of {}",
                n,
                psl.q_name
            ));
        }

        Ok(psl)
    }
}

impl Psl {
    pub fn write_to<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        write!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
            self.match_count,
            self.mismatch_count,
            self.rep_match,
            self.n_count,
            self.q_num_insert,
            self.q_base_insert,
            self.t_num_insert,
            self.t_base_insert,
            self.strand,
            self.q_name,
            self.q_size,
            self.q_start,
            self.q_end,
            self.t_name,
            self.t_size,
            self.t_start,
            self.t_end,
            self.block_count
        )?;

        let lists = [&self.block_sizes, &self.q_starts, &self.t_starts];
        for (i, list) in lists.iter().enumerate() {
            if i > 0 {
                write!(w, "\t")?;
            }
            for s in list.iter() {
                write!(w, "{},", s)?;
            }
        }

        writeln!(w)?;
        Ok(())
    }
}

impl fmt::Display for Psl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        let s = String::from_utf8_lossy(&buf);
        write!(f, "{}", s.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "59\t13\t0\t0\t2\t3\t1\t1\t+\tquery\t100\t10\t90\ttarget\t200\t50\t130\t2\t40,40,\t10,50,\t50,90,";

    #[test]
    fn test_parse_and_display() {
        let psl: Psl = LINE.parse().unwrap();
        assert_eq!(psl.match_count, 59);
        assert_eq!(psl.block_count, 2);
        assert_eq!(psl.block_sizes, vec![40, 40]);
        assert_eq!(psl.q_starts, vec![10, 50]);
        assert_eq!(psl.t_starts, vec![50, 90]);
        assert_eq!(psl.to_string(), LINE);
    }

    #[test]
    fn test_parse_space_separated() {
        let line = LINE.replace('\t', " ");
        let psl: Psl = line.parse().unwrap();
        assert_eq!(psl.t_name, "target");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("59\t13".parse::<Psl>().is_err());

        let line = LINE.replacen("59", "invalid", 1);
        assert!(line.parse::<Psl>().is_err());

        // three blocks announced, two given
        let line = LINE.replace("\t2\t40,40,", "\t3\t40,40,");
        assert!(line.parse::<Psl>().is_err());
    }

    #[test]
    fn test_score_and_cover() {
        let psl: Psl = LINE.parse().unwrap();
        assert!(!psl.is_protein());
        // 59 - 13 - 2 - 1
        assert_eq!(psl.score(), 43);
        assert_eq!(psl.calc_aligned(), 72);
        assert_eq!(psl.calc_q_cover(), 0.72);
        assert_eq!(psl.calc_t_cover(), 0.36);
        assert!((psl.calc_ident() - 59.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_protein() {
        let mut psl = Psl::new();
        assert!(!psl.is_protein());

        psl.block_count = 1;
        psl.block_sizes = vec![10];
        psl.t_starts = vec![0];
        psl.t_end = 30;
        psl.strand = "++".to_string();
        assert!(psl.is_protein());

        psl.t_end = 10;
        assert!(!psl.is_protein());
    }

    #[test]
    fn test_to_gene_minus() {
        let line = "10\t0\t0\t0\t0\t0\t0\t0\t-\tq\t10\t0\t10\tchrX\t1000\t100\t130\t2\t5,5,\t0,5,\t100,125,";
        let psl: Psl = line.parse().unwrap();
        let gene = psl.to_gene().unwrap();
        assert_eq!(gene.strand, "-");
        assert_eq!(gene.exons(), vec![(100, 105), (125, 130)]);
        assert_eq!(gene.score, 10);
    }
}
