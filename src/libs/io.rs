use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Opens `input` for buffered reading. `stdin` reads the standard input and
/// files ending in `.gz` are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = featureio::reader("tests/fasta/small.fa").unwrap();
/// assert_eq!(reader.lines().count(), 7);
///
/// let reader = featureio::reader("tests/fasta/small.fa.gz").unwrap();
/// assert_eq!(reader.lines().count(), 7);
///
/// assert!(featureio::reader("tests/fasta/not_there.fa").is_err());
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path)
            .map_err(|why| anyhow::anyhow!("could not open {}: {}", path.display(), why))?;

        if is_gz(path) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Opens `output` for buffered writing, `stdout` being the screen.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .map_err(|why| anyhow::anyhow!("could not create {}: {}", output, why))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

pub fn is_gz<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension() == Some(std::ffi::OsStr::new("gz"))
}

/// Reads the first whitespace-delimited column of every non-empty line.
/// Lines starting with `#` are skipped.
pub fn read_first_column(input: &str) -> anyhow::Result<Vec<String>> {
    let reader = reader(input)?;
    let mut names = vec![];
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        if let Some(first) = line.split_whitespace().next() {
            names.push(first.to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_reader_plain_and_gz() {
        let dir = tempdir().unwrap();

        let plain = dir.path().join("test.fa");
        {
            let mut file = File::create(&plain).unwrap();
            writeln!(file, ">seq1\nACGT").unwrap();
        }

        let gz = dir.path().join("test.fa.gz");
        {
            let file = File::create(&gz).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            writeln!(encoder, ">seq1\nACGT").unwrap();
            encoder.finish().unwrap();
        }

        for path in [&plain, &gz] {
            let lines: Vec<String> = reader(path.to_str().unwrap())
                .unwrap()
                .lines()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(lines, vec![">seq1".to_string(), "ACGT".to_string()]);
        }
        assert!(is_gz(&gz));
        assert!(!is_gz(&plain));
    }

    #[test]
    fn test_read_first_column() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("list.txt");
        std::fs::write(&list, "seq1\textra\n# comment\n\n  seq3\n").unwrap();

        let names = read_first_column(list.to_str().unwrap()).unwrap();
        assert_eq!(names, vec!["seq1", "seq3"]);
    }

    #[test]
    fn test_writer_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        {
            let mut w = writer(out.to_str().unwrap()).unwrap();
            w.write_all(b"hello\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
    }
}
