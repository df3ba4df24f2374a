//! FASTA index (`.fai`) records and random access to indexed FASTA files.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::libs::error::{FioError, Result};
use crate::libs::seq::{check_range, parse_header, Seq};

/// One line of a samtools-style FASTA index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaiRecord {
    pub name: String,
    /// bases in the sequence
    pub length: usize,
    /// byte offset of the first base
    pub offset: u64,
    /// bases per line
    pub line_bases: usize,
    /// bytes per line, including the line terminator
    pub line_width: usize,
}

impl FaiRecord {
    /// File position of the 0-based base `pos`
    ///
    /// ```
    /// # use featureio::libs::fai::FaiRecord;
    /// let rec: FaiRecord = "seq1\t10\t6\t4\t5".parse().unwrap();
    /// assert_eq!(rec.byte_offset(0), 6);
    /// assert_eq!(rec.byte_offset(3), 9);
    /// assert_eq!(rec.byte_offset(4), 11);
    /// assert_eq!(rec.byte_offset(9), 17);
    /// ```
    pub fn byte_offset(&self, pos: usize) -> u64 {
        if self.line_bases == 0 {
            return self.offset;
        }
        let line = pos / self.line_bases;
        let col = pos % self.line_bases;
        self.offset + (line * self.line_width + col) as u64
    }
}

impl std::str::FromStr for FaiRecord {
    type Err = FioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split('\t').collect();
        let malformed = || FioError::MalformedIndex {
            fields: fields.len(),
            line: line.to_string(),
        };

        if fields.len() != 5 {
            return Err(malformed());
        }

        Ok(FaiRecord {
            name: fields[0].to_string(),
            length: fields[1].parse().map_err(|_| malformed())?,
            offset: fields[2].parse().map_err(|_| malformed())?,
            line_bases: fields[3].parse().map_err(|_| malformed())?,
            line_width: fields[4].parse().map_err(|_| malformed())?,
        })
    }
}

impl fmt::Display for FaiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_width
        )
    }
}

pub fn index_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut s = path.as_ref().as_os_str().to_owned();
    s.push(".fai");
    PathBuf::from(s)
}

// Per-record state while scanning a FASTA file
struct Pending {
    record: FaiRecord,
    // a line shorter than line_bases has been seen
    short_line: bool,
}

/// Scans a plain FASTA file and builds its index.
///
/// All sequence lines of a record but the last must have the same length.
pub fn index_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<FaiRecord>> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let malformed = |msg: String| FioError::MalformedFasta {
        path: display.clone(),
        msg,
    };

    if crate::libs::io::is_gz(path) {
        return Err(malformed("compressed files can't be indexed".to_string()));
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut records: Vec<FaiRecord> = vec![];
    let mut current: Option<Pending> = None;
    let mut pos: u64 = 0;
    let mut lineno = 0usize;
    let mut buf = vec![];

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        lineno += 1;
        pos += n as u64;

        if buf.first() == Some(&b'>') {
            if let Some(p) = current.take() {
                records.push(p.record);
            }
            let header = String::from_utf8_lossy(&buf);
            let (name, _) = parse_header(&header);
            current = Some(Pending {
                record: FaiRecord {
                    name,
                    length: 0,
                    offset: pos,
                    line_bases: 0,
                    line_width: 0,
                },
                short_line: false,
            });
            continue;
        }

        let bases = buf
            .iter()
            .rev()
            .skip_while(|&&b| b == b'\n' || b == b'\r')
            .count();

        let Some(p) = current.as_mut() else {
            if bases > 0 {
                return Err(malformed(format!("sequence before first header at line {}", lineno)));
            }
            continue;
        };

        if bases == 0 {
            // blank lines are only tolerated at the end of a record
            p.short_line = true;
            continue;
        }
        if p.short_line {
            return Err(malformed(format!(
                "different line length in sequence {} at line {}",
                p.record.name, lineno
            )));
        }

        if p.record.line_bases == 0 {
            p.record.line_bases = bases;
            p.record.line_width = n;
        } else if bases > p.record.line_bases
            // an unterminated line can only be the last one
            || (n != bases && n - bases != p.record.line_width - p.record.line_bases)
        {
            return Err(malformed(format!(
                "different line length in sequence {} at line {}",
                p.record.name, lineno
            )));
        } else if bases < p.record.line_bases {
            p.short_line = true;
        }
        p.record.length += bases;
    }

    if let Some(p) = current.take() {
        records.push(p.record);
    }

    log::debug!("indexed {} sequences in {}", records.len(), display);
    Ok(records)
}

pub fn write_index<W: Write + ?Sized>(records: &[FaiRecord], writer: &mut W) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    Ok(())
}

/// A FASTA file with its `.fai` index.
///
/// Sequences are read straight from disk, so large genomes never need to be
/// loaded whole.
#[derive(Debug, Clone)]
pub struct IndexedFasta {
    filename: PathBuf,
    index_filename: PathBuf,
    records: IndexMap<String, FaiRecord>,
}

impl IndexedFasta {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let filename = path.as_ref().to_path_buf();
        let index_filename = index_path(&filename);

        if !filename.exists() {
            return Err(FioError::MissingFasta(filename.display().to_string()));
        }
        if !index_filename.exists() {
            return Err(FioError::MissingIndex(index_filename.display().to_string()));
        }

        let reader = BufReader::new(File::open(&index_filename)?);
        let mut records = IndexMap::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record: FaiRecord = line.parse()?;
            if records.contains_key(&record.name) {
                return Err(FioError::DuplicateName {
                    name: record.name,
                    path: filename.display().to_string(),
                });
            }
            records.insert(record.name.clone(), record);
        }

        Ok(Self {
            filename,
            index_filename,
            records,
        })
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn index_filename(&self) -> &Path {
        &self.index_filename
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Sequence names in index order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn record(&self, name: &str) -> Option<&FaiRecord> {
        self.records.get(name)
    }

    fn lookup(&self, name: &str) -> Result<&FaiRecord> {
        self.records.get(name).ok_or_else(|| FioError::NotFound {
            name: name.to_string(),
            source_name: self.filename.display().to_string(),
        })
    }

    /// Retrieves a whole record, header description included.
    pub fn get_sequence(&self, name: &str) -> Result<Seq> {
        let record = self.lookup(name)?;
        let mut file = File::open(&self.filename)?;

        let header = read_header(&mut file, record.offset)?.ok_or_else(|| {
            FioError::MalformedFasta {
                path: self.filename.display().to_string(),
                msg: format!("offset {} of {} does not follow a header", record.offset, name),
            }
        })?;
        let (_, description) = parse_header(&header);
        let sequence = read_bases(&mut file, record, 0, record.length)?;

        Ok(Seq::new(name, &sequence, description.as_deref()))
    }

    /// Reads the 0-based, half-open range `start..end` of a sequence.
    pub fn fetch(&self, name: &str, start: usize, end: usize) -> Result<Vec<u8>> {
        let record = self.lookup(name)?;
        check_range(name, start, end, record.length)?;
        let mut file = File::open(&self.filename)?;
        read_bases(&mut file, record, start, end)
    }
}

fn read_bases<R: Read + Seek>(
    reader: &mut R,
    record: &FaiRecord,
    start: usize,
    end: usize,
) -> Result<Vec<u8>> {
    if start >= end {
        return Ok(vec![]);
    }

    let first = record.byte_offset(start);
    let last = record.byte_offset(end - 1);
    let mut raw = vec![0u8; (last - first + 1) as usize];
    reader.seek(SeekFrom::Start(first))?;
    reader.read_exact(&mut raw)?;

    raw.retain(|b| !b.is_ascii_whitespace());
    Ok(raw)
}

// The index points at the first base, so walk backwards to the start of the
// header line that precedes it.
fn read_header<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Option<String>> {
    const CHUNK: u64 = 4096;

    // skip the terminator of the header line itself
    let mut end = offset;
    let mut tail: Vec<u8> = vec![];
    loop {
        let start = end.saturating_sub(CHUNK);
        let mut chunk = vec![0u8; (end - start) as usize];
        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&tail);
        tail = chunk;

        let body_len = tail
            .iter()
            .rev()
            .take_while(|&&b| b == b'\n' || b == b'\r')
            .count();
        let body = &tail[..tail.len() - body_len];

        if let Some(nl) = body.iter().rposition(|&b| b == b'\n') {
            tail = body[nl + 1..].to_vec();
            break;
        }
        if start == 0 {
            tail = body.to_vec();
            break;
        }
        end = start;
    }

    if tail.first() != Some(&b'>') {
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&tail).into_owned()))
}

/// Several indexed FASTA files addressed as one namespace.
#[derive(Debug, Clone)]
pub struct IndexedFastaCollection {
    fastas: Vec<IndexedFasta>,
    index_map: HashMap<String, usize>,
}

impl IndexedFastaCollection {
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut fastas = vec![];
        let mut index_map = HashMap::new();

        for (i, path) in paths.iter().enumerate() {
            let fasta = IndexedFasta::open(path)?;
            for name in fasta.names() {
                if index_map.insert(name.to_string(), i).is_some() {
                    return Err(FioError::KeyCollision(name.to_string()));
                }
            }
            fastas.push(fasta);
        }

        Ok(Self { fastas, index_map })
    }

    pub fn len(&self) -> usize {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_map.contains_key(name)
    }

    /// All sequence names, file by file in index order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fastas.iter().flat_map(|f| f.names())
    }

    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.names()
    }

    fn fasta_for(&self, name: &str) -> Result<&IndexedFasta> {
        self.index_map
            .get(name)
            .map(|&i| &self.fastas[i])
            .ok_or_else(|| FioError::NotFound {
                name: name.to_string(),
                source_name: "any index".to_string(),
            })
    }

    pub fn get_sequence(&self, name: &str) -> Result<Seq> {
        self.fasta_for(name)?.get_sequence(name)
    }

    pub fn fetch(&self, name: &str, start: usize, end: usize) -> Result<Vec<u8>> {
        self.fasta_for(name)?.fetch(name, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_indexed(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let fa = dir.path().join(name);
        std::fs::write(&fa, content).unwrap();
        let records = index_fasta(&fa).unwrap();
        let mut out = File::create(index_path(&fa)).unwrap();
        write_index(&records, &mut out).unwrap();
        fa
    }

    #[test]
    fn test_parse_record() {
        let rec: FaiRecord = "chr1\t248956422\t112\t70\t71".parse().unwrap();
        assert_eq!(rec.name, "chr1");
        assert_eq!(rec.length, 248956422);
        assert_eq!(rec.offset, 112);
        assert_eq!(rec.to_string(), "chr1\t248956422\t112\t70\t71");

        assert!("not a well formed file".parse::<FaiRecord>().is_err());
        assert!("chr1\tten\t112\t70\t71".parse::<FaiRecord>().is_err());
    }

    #[test]
    fn test_index_fasta() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("test.fa");
        std::fs::write(&fa, ">s1 desc\nACGT\nACGT\nAC\n>s2\nAAA\n>s3\n").unwrap();

        let records = index_fasta(&fa).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].to_string(), "s1\t10\t9\t4\t5");
        assert_eq!(records[1].to_string(), "s2\t3\t26\t3\t4");
        assert_eq!(records[2].to_string(), "s3\t0\t34\t0\t0");
    }

    #[test]
    fn test_index_crlf() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("test.fa");
        std::fs::write(&fa, ">s1\r\nACG\r\nAC\r\n").unwrap();

        let records = index_fasta(&fa).unwrap();
        assert_eq!(records[0].to_string(), "s1\t5\t5\t3\t5");

        // no newline at end of file
        std::fs::write(&fa, ">s1\nACGT\nAC").unwrap();
        let records = index_fasta(&fa).unwrap();
        assert_eq!(records[0].to_string(), "s1\t6\t4\t4\t5");
    }

    #[test]
    fn test_index_uneven_lines() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("test.fa");
        std::fs::write(&fa, ">s1\nAC\nACGT\n").unwrap();
        assert!(matches!(index_fasta(&fa), Err(FioError::MalformedFasta { .. })));

        std::fs::write(&fa, ">s1\nACGT\n\nACGT\n").unwrap();
        assert!(matches!(index_fasta(&fa), Err(FioError::MalformedFasta { .. })));
    }

    #[test]
    fn test_get_sequence_and_fetch() {
        let dir = TempDir::new().unwrap();
        let fa = write_indexed(
            &dir,
            "test.fa",
            ">s1 first sequence\nACGT\nTTGG\nCC\n>s2\nGGGAAA\n",
        );

        let indexed = IndexedFasta::open(&fa).unwrap();
        assert_eq!(indexed.len(), 2);
        assert!(indexed.contains("s2"));
        assert_eq!(indexed.names().collect::<Vec<_>>(), vec!["s1", "s2"]);

        let s1 = indexed.get_sequence("s1").unwrap();
        assert_eq!(s1.name(), "s1");
        assert_eq!(s1.description(), Some("first sequence"));
        assert_eq!(s1.sequence(), b"ACGTTTGGCC");

        assert_eq!(indexed.fetch("s1", 2, 7).unwrap(), b"GTTTG");
        assert_eq!(indexed.fetch("s1", 3, 4).unwrap(), b"T");
        assert_eq!(indexed.fetch("s1", 4, 4).unwrap(), b"");
        assert_eq!(indexed.fetch("s2", 0, 6).unwrap(), b"GGGAAA");
        assert!(matches!(
            indexed.fetch("s1", 5, 11),
            Err(FioError::OutOfRange { .. })
        ));
        assert!(matches!(
            indexed.get_sequence("idontexist"),
            Err(FioError::NotFound { .. })
        ));
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nonexistent");
        assert!(matches!(
            IndexedFasta::open(&missing),
            Err(FioError::MissingFasta(_))
        ));

        let fa = dir.path().join("nonexistent_index");
        std::fs::write(&fa, ">a\nA").unwrap();
        assert!(matches!(
            IndexedFasta::open(&fa),
            Err(FioError::MissingIndex(_))
        ));
    }

    #[test]
    fn test_bad_index() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("test.fa");
        std::fs::write(&fa, ">hi\nAAAAAAA").unwrap();
        std::fs::write(index_path(&fa), "not a well formed file").unwrap();
        assert!(matches!(
            IndexedFasta::open(&fa),
            Err(FioError::MalformedIndex { .. })
        ));
    }

    #[test]
    fn test_redundant_record_names() {
        let dir = TempDir::new().unwrap();
        let fa = dir.path().join("redundant");
        std::fs::write(&fa, ">redundant_name\nACGT\n>redundant_name\nACGT").unwrap();
        std::fs::write(
            index_path(&fa),
            "redundant_name\t4\t16\t4\t5\nredundant_name\t4\t37\t4\t5",
        )
        .unwrap();
        assert!(matches!(
            IndexedFasta::open(&fa),
            Err(FioError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_collection() {
        let dir = TempDir::new().unwrap();
        let a = write_indexed(&dir, "a.fa", ">a1\nACGT\n>a2\nCC\n");
        let b = write_indexed(&dir, "b.fa", ">b1\nGGGG\n");

        let collection = IndexedFastaCollection::open(&[&a, &b]).unwrap();
        assert_eq!(collection.len(), 3);
        assert!(collection.contains("b1"));
        assert!(!collection.contains("c1"));
        assert_eq!(
            collection.names().collect::<Vec<_>>(),
            collection.sequence_names().collect::<Vec<_>>()
        );
        assert_eq!(collection.get_sequence("a2").unwrap().sequence(), b"CC");
        assert_eq!(collection.fetch("b1", 1, 3).unwrap(), b"GG");
        assert!(matches!(
            collection.get_sequence("idontexist"),
            Err(FioError::NotFound { .. })
        ));

        let err = IndexedFastaCollection::open(&[&a, &a]).unwrap_err();
        assert!(err.to_string().starts_with("Key collision"));
    }
}
