use clap::*;
use indexmap::IndexMap;
use log::{info, warn};
use std::io::Write;

use featureio::libs::fai::{index_path, IndexedFasta};
use featureio::libs::nt::reverse_complement;
use featureio::libs::seq::{write_fasta_record, FastaReader, Seq, DEFAULT_WRAP};
use featureio::FioError;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("substr")
        .about("Extracts a substring of a FASTA record")
        .after_help(
            r###"
This command prints part of one sequence on a single line.

<start> and <end> are 0-based and half-open: `seq1 0 10` are the first ten
bases of seq1. Coordinates past the end of the sequence, or a start after the
end, are errors.

With --region, the positional coordinates are replaced by 1-based, inclusive
ranges written as `name(strand):start-end`. Each range is written as a FASTA
record named after the range; a bare `name` means the whole sequence and a `-`
strand gives the reverse complement.

Notes:
* If <infile>.fai exists only the requested bytes are read, otherwise the file
  is streamed
* Supports both plain text and gzipped (.gz) files

Examples:
1. Bases 10 to 19 of seq1:
   featureio fa substr input.fa seq1 10 20

2. The same on the reverse strand:
   featureio fa substr input.fa seq1 10 20 --rc

3. Ranges as FASTA:
   featureio fa substr input.fa -r "seq1(+):11-20" "seq2(-):1-5"

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input FASTA file to process"),
        )
        .arg(
            Arg::new("name")
                .required_unless_present("region")
                .num_args(1)
                .index(2)
                .help("Name of the sequence"),
        )
        .arg(
            Arg::new("start")
                .required_unless_present("region")
                .num_args(1)
                .index(3)
                .value_parser(value_parser!(usize))
                .help("0-based start"),
        )
        .arg(
            Arg::new("end")
                .required_unless_present("region")
                .num_args(1)
                .index(4)
                .value_parser(value_parser!(usize))
                .help("End, exclusive"),
        )
        .arg(
            Arg::new("rc")
                .long("rc")
                .action(ArgAction::SetTrue)
                .help("Reverse complement the substring"),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .short('r')
                .num_args(1..)
                .conflicts_with_all(["name", "start", "end", "rc"])
                .help("1-based ranges, e.g. seq1(+):1-100"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

/// Where sequences come from: the index, or records loaded while streaming
enum Source {
    Indexed(IndexedFasta),
    Loaded(IndexMap<String, Seq>),
}

impl Source {
    /// Opens `infile`. When streaming, only records in `names` are kept.
    fn open(infile: &str, names: &[String]) -> anyhow::Result<Self> {
        if infile != "stdin" && !featureio::is_gz(infile) && index_path(infile).exists() {
            info!("Reading {} through its index", infile);
            return Ok(Source::Indexed(IndexedFasta::open(infile)?));
        }

        let mut loaded = IndexMap::new();
        for result in FastaReader::new(featureio::reader(infile)?) {
            let seq = result?;
            if names.iter().any(|n| n == seq.name()) && !loaded.contains_key(seq.name()) {
                loaded.insert(seq.name().to_string(), seq);
            }
        }
        Ok(Source::Loaded(loaded))
    }

    fn length(&self, name: &str) -> Option<usize> {
        match self {
            Source::Indexed(fasta) => fasta.record(name).map(|r| r.length),
            Source::Loaded(seqs) => seqs.get(name).map(|s| s.len()),
        }
    }

    fn fetch(&self, name: &str, start: usize, end: usize) -> featureio::Result<Vec<u8>> {
        match self {
            Source::Indexed(fasta) => fasta.fetch(name, start, end),
            Source::Loaded(seqs) => {
                let seq = seqs.get(name).ok_or_else(|| FioError::NotFound {
                    name: name.to_string(),
                    source_name: "input".to_string(),
                })?;
                Ok(seq.subseq(start, end)?.to_vec())
            }
        }
    }
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = featureio::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ranges as FASTA
    //----------------------------
    if let Some(regions) = args.get_many::<String>("region") {
        let ranges: Vec<intspan::Range> =
            regions.map(|el| intspan::Range::from_str(el)).collect();
        let names: Vec<String> = ranges.iter().map(|rg| rg.chr().to_string()).collect();
        let source = Source::open(infile, &names)?;

        for rg in &ranges {
            let name = rg.chr();
            let Some(length) = source.length(name) else {
                warn!("{} for [{}] not found in {}", name, rg, infile);
                continue;
            };

            // a bare name means the whole sequence
            let (start, end) = if *rg.start() == 0 {
                (0, length)
            } else {
                ((*rg.start() as usize).saturating_sub(1), *rg.end() as usize)
            };

            let mut bases = source.fetch(name, start, end)?;
            if rg.strand() == "-" {
                bases = reverse_complement(&bases);
            }

            let seq = Seq::new(&rg.to_string(), &bases, None);
            write_fasta_record(&seq, &mut writer, DEFAULT_WRAP)?;
        }

        return Ok(());
    }

    //----------------------------
    // One substring
    //----------------------------
    let name = args.get_one::<String>("name").unwrap();
    let start = *args.get_one::<usize>("start").unwrap();
    let end = *args.get_one::<usize>("end").unwrap();

    let source = Source::open(infile, std::slice::from_ref(name))?;
    if source.length(name).is_none() {
        return Err(FioError::NotFound {
            name: name.to_string(),
            source_name: infile.to_string(),
        }
        .into());
    }

    let mut bases = source.fetch(name, start, end)?;
    if args.get_flag("rc") {
        bases = reverse_complement(&bases);
    }

    writer.write_all(&bases)?;
    writer.write_all(b"\n")?;

    Ok(())
}
