//! Length and composition statistics over sets of sequences.

use crate::libs::nt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeqStat {
    pub name: String,
    pub length: usize,
    pub gc: f64,
    pub n_count: usize,
}

impl SeqStat {
    /// ```
    /// # use featureio::libs::stat::SeqStat;
    /// let st = SeqStat::new("seq1", b"GGCCAANN");
    /// assert_eq!(st.length, 8);
    /// assert_eq!(st.n_count, 2);
    /// assert!((st.gc - 4.0 / 6.0).abs() < 1e-9);
    /// ```
    pub fn new(name: &str, seq: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            length: seq.len(),
            gc: nt::gc_content(seq),
            n_count: seq.iter().filter(|&&b| nt::is_n(b)).count(),
        }
    }
}

/// Aggregated statistics, fed one sequence at a time
#[derive(Debug, Clone, Default)]
pub struct Summary {
    lengths: Vec<usize>,
    gc_bases: usize,
    non_n_bases: usize,
}

impl Summary {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, seq: &[u8]) {
        let (gc, non_n) = nt::gc_counts(seq);
        self.gc_bases += gc;
        self.non_n_bases += non_n;
        self.lengths.push(seq.len());
    }

    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    pub fn total(&self) -> usize {
        self.lengths.iter().sum()
    }

    pub fn min(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        if self.lengths.is_empty() {
            0.0
        } else {
            self.total() as f64 / self.count() as f64
        }
    }

    /// Length L such that sequences at least L long cover half of the total
    ///
    /// ```
    /// # use featureio::libs::stat::Summary;
    /// let mut summary = Summary::new();
    /// for seq in ["AAAAAAAAAA", "AAAAAA", "AAAA", "AA"] {
    ///     summary.add(seq.as_bytes());
    /// }
    /// // 10 + 6 >= 22 / 2
    /// assert_eq!(summary.n50(), 6);
    /// ```
    pub fn n50(&self) -> usize {
        let mut sorted = self.lengths.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let total = self.total();
        let mut acc = 0;
        for len in sorted {
            acc += len;
            if acc * 2 >= total {
                return len;
            }
        }
        0
    }

    pub fn gc(&self) -> f64 {
        if self.non_n_bases == 0 {
            0.0
        } else {
            self.gc_bases as f64 / self.non_n_bases as f64
        }
    }

    pub fn header() -> &'static str {
        "count\ttotal\tmin\tmax\tmean\tn50\tgc"
    }

    pub fn to_row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.2}\t{}\t{:.4}",
            self.count(),
            self.total(),
            self.min(),
            self.max(),
            self.mean(),
            self.n50(),
            self.gc()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_summary() {
        let summary = Summary::new();
        assert_eq!(summary.count(), 0);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.min(), 0);
        assert_eq!(summary.max(), 0);
        assert_eq!(summary.n50(), 0);
        assert_eq!(summary.to_row(), "0\t0\t0\t0\t0.00\t0\t0.0000");
    }

    #[test]
    fn test_summary() {
        let mut summary = Summary::new();
        summary.add(b"GGGG");
        summary.add(b"AATTNN");
        summary.add(b"C");

        assert_eq!(summary.count(), 3);
        assert_eq!(summary.total(), 11);
        assert_eq!(summary.min(), 1);
        assert_eq!(summary.max(), 6);
        assert_relative_eq!(summary.mean(), 11.0 / 3.0);
        // 6 alone is 12 >= 11
        assert_eq!(summary.n50(), 6);
        assert_relative_eq!(summary.gc(), 5.0 / 9.0);
        assert_eq!(summary.to_row(), "3\t11\t1\t6\t3.67\t6\t0.5556");
    }

    #[test]
    fn test_seq_stat_all_n() {
        let st = SeqStat::new("gap", b"NNNN");
        assert_eq!(st.length, 4);
        assert_eq!(st.n_count, 4);
        assert_relative_eq!(st.gc, 0.0);
    }
}
