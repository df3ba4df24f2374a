use std::io::{BufRead, Write};
use std::ops::Range;

use crate::libs::error::{FioError, Result};

/// Line width used when writing FASTA without an explicit setting
pub const DEFAULT_WRAP: usize = 100;

/// A named biological sequence.
///
/// `description` holds whatever followed the first run of whitespace on the
/// FASTA header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seq {
    name: String,
    sequence: Vec<u8>,
    description: Option<String>,
}

impl Seq {
    pub fn new(name: &str, sequence: &[u8], description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_vec(),
            description: description.map(|d| d.to_string()),
        }
    }

    // Immutable accessors
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// ```
    /// # use featureio::libs::seq::Seq;
    /// let seq = Seq::new("testname", b"ACGT", None);
    /// assert_eq!(seq.get(1..2), Some(&b"C"[..]));
    /// assert_eq!(seq.get(2..8), None);
    /// ```
    pub fn get(&self, range: Range<usize>) -> Option<&[u8]> {
        self.sequence.get(range)
    }

    /// 0-based, half-open slice with coordinate validation.
    ///
    /// ```
    /// # use featureio::libs::seq::Seq;
    /// let seq = Seq::new("s", b"ACGTACGT", None);
    /// assert_eq!(seq.subseq(2, 5).unwrap(), b"GTA");
    /// assert_eq!(seq.subseq(8, 8).unwrap(), b"");
    /// assert!(seq.subseq(5, 2).is_err());
    /// assert!(seq.subseq(0, 9).is_err());
    /// ```
    pub fn subseq(&self, start: usize, end: usize) -> Result<&[u8]> {
        check_range(&self.name, start, end, self.len())?;
        Ok(&self.sequence[start..end])
    }
}

pub(crate) fn check_range(name: &str, start: usize, end: usize, length: usize) -> Result<()> {
    if start > end || end > length {
        return Err(FioError::OutOfRange {
            name: name.to_string(),
            start,
            end,
            length,
        });
    }
    Ok(())
}

/// Splits a header line (without the leading `>`) into name and description
fn split_header(header: &str) -> (String, Option<String>) {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((name, rest)) => {
            let rest = rest.trim_start();
            let description = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (name.to_string(), description)
        }
        None => (header.to_string(), None),
    }
}

pub(crate) fn parse_header(line: &str) -> (String, Option<String>) {
    split_header(line.strip_prefix('>').unwrap_or(line))
}

/// Streaming FASTA reader.
///
/// Anything ahead of the first header is ignored, and whitespace inside
/// sequence lines is dropped.
///
/// ```
/// # use featureio::libs::seq::FastaReader;
/// let input = "junk\n>seq1 first one\nAC GT\nAC\n>seq2\n\nTT\n";
/// let records: Vec<_> = FastaReader::new(input.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].name(), "seq1");
/// assert_eq!(records[0].description(), Some("first one"));
/// assert_eq!(records[0].sequence(), b"ACGTAC");
/// assert_eq!(records[1].sequence(), b"TT");
/// ```
pub struct FastaReader<R> {
    reader: R,
    line: String,
    // header of the record about to be read
    pending: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pending: None,
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        Ok(n > 0)
    }

    fn next_record(&mut self) -> Result<Option<Seq>> {
        if self.pending.is_none() {
            loop {
                if !self.read_line()? {
                    self.done = true;
                    return Ok(None);
                }
                if self.line.starts_with('>') {
                    self.pending = Some(self.line.clone());
                    break;
                }
            }
        }

        let header = self.pending.take().unwrap_or_default();
        let (name, description) = parse_header(&header);
        let mut sequence = vec![];

        loop {
            if !self.read_line()? {
                self.done = true;
                break;
            }
            if self.line.starts_with('>') {
                self.pending = Some(self.line.clone());
                break;
            }
            sequence.extend(self.line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(Seq {
            name,
            sequence,
            description,
        }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Seq>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(seq)) => Some(Ok(seq)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Consumes any lines ahead of the first `>` header.
///
/// ```
/// # use featureio::libs::seq::skip_to_header;
/// # use std::io::BufRead;
/// let mut reader = "junk\n\n>seq1\nACGT\n".as_bytes();
/// skip_to_header(&mut reader).unwrap();
/// let mut line = String::new();
/// reader.read_line(&mut line).unwrap();
/// assert_eq!(line, ">seq1\n");
/// ```
pub fn skip_to_header<R: BufRead + ?Sized>(reader: &mut R) -> Result<()> {
    let mut discard = vec![];
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() || buf[0] == b'>' {
            return Ok(());
        }
        discard.clear();
        reader.read_until(b'\n', &mut discard)?;
    }
}

/// Reads the first FASTA record. `None` when no header exists before EOF.
pub fn parse_fasta_record<R: BufRead>(reader: R) -> Result<Option<Seq>> {
    FastaReader::new(reader).next().transpose()
}

/// Formats a record, wrapping the sequence every `wrap` columns.
/// A `wrap` of 0 keeps the sequence on one line.
///
/// ```
/// # use featureio::libs::seq::{fasta_string, Seq};
/// let seq = Seq::new("testname", b"AAAAAAAA", None);
/// assert_eq!(fasta_string(&seq, 2), ">testname\nAA\nAA\nAA\nAA\n");
///
/// let seq = Seq::new("testname", b"AAAAA", Some("some description"));
/// assert_eq!(fasta_string(&seq, 0), ">testname some description\nAAAAA\n");
/// ```
pub fn fasta_string(seq: &Seq, wrap: usize) -> String {
    let mut buf = vec![];
    // writing into a Vec never fails
    let _ = write_fasta_record(seq, &mut buf, wrap);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn write_fasta_record<W: Write + ?Sized>(seq: &Seq, writer: &mut W, wrap: usize) -> Result<()> {
    match seq.description() {
        Some(d) => writeln!(writer, ">{} {}", seq.name(), d)?,
        None => writeln!(writer, ">{}", seq.name())?,
    }

    let wrap = if wrap == 0 { usize::MAX } else { wrap };
    for chunk in seq.sequence().chunks(wrap) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_to_header() {
        let mut reader = "no header here\n".as_bytes();
        skip_to_header(&mut reader).unwrap();
        assert!(reader.is_empty());

        let mut reader = ">a\nAC\n".as_bytes();
        skip_to_header(&mut reader).unwrap();
        assert_eq!(reader, b">a\nAC\n");
    }

    #[test]
    fn test_read_empty_input() {
        assert!(parse_fasta_record(" ".as_bytes()).unwrap().is_none());
        assert!(parse_fasta_record("".as_bytes()).unwrap().is_none());
        assert_eq!(FastaReader::new("ACGT\nACGT\n".as_bytes()).count(), 0);
    }

    #[test]
    fn test_read_without_trailing_newline() {
        let seq = parse_fasta_record(">hi\nAAAAAAA".as_bytes()).unwrap().unwrap();
        assert_eq!(seq.name(), "hi");
        assert_eq!(seq.description(), None);
        assert_eq!(seq.sequence(), b"AAAAAAA");
    }

    #[test]
    fn test_read_crlf_and_empty_record() {
        let input = ">a desc with  spaces \r\nAC\r\nGT\r\n>b\r\n>c\r\nG\r\n";
        let records: Vec<Seq> = FastaReader::new(input.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].description(), Some("desc with  spaces"));
        assert_eq!(records[0].sequence(), b"ACGT");
        assert!(records[1].is_empty());
        assert_eq!(records[2].sequence(), b"G");
    }

    #[test]
    fn test_seq_get() {
        let seq = Seq::new("testname", b"ACGT", None);
        assert_eq!(seq.get(1..2).unwrap(), b"C");
        assert_eq!(seq.len(), 4);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_write_fasta() {
        let seq = Seq::new("testname", b"AAAAAAAA", None);
        let mut buf = vec![];
        write_fasta_record(&seq, &mut buf, 2).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), ">testname\nAA\nAA\nAA\nAA\n");

        // uneven final line
        let seq = Seq::new("x", b"ACGTA", None);
        assert_eq!(fasta_string(&seq, 2), ">x\nAC\nGT\nA\n");

        // empty sequences keep only the header
        let seq = Seq::new("x", b"", None);
        assert_eq!(fasta_string(&seq, DEFAULT_WRAP), ">x\n");
    }

    #[test]
    fn test_subseq_out_of_range() {
        let seq = Seq::new("s", b"ACGT", None);
        match seq.subseq(3, 10) {
            Err(FioError::OutOfRange { length, .. }) => assert_eq!(length, 4),
            _ => panic!("expected OutOfRange"),
        }
    }
}
