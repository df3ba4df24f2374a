use clap::*;
use indexmap::IndexMap;
use log::{debug, info, warn};

use featureio::libs::fai::{index_path, IndexedFasta};
use featureio::libs::seq::{write_fasta_record, FastaReader, Seq};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("extract")
        .about("Extracts FASTA records by name")
        .after_help(
            r###"
This command writes the requested records of a FASTA file, in the order they
were requested. Header descriptions are kept.

Notes:
* Names come from the command line, from a list file (-l, first column), or both
* With no names at all, every record is written
* If <infile>.fai exists the records are read through the index, otherwise the
  file is streamed
* Names not present in the file are reported and skipped. The command fails
  only when none of them is found
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'

Examples:
1. Extract two records:
   featureio fa extract input.fa seq1 seq2

2. Extract the records listed in a file:
   featureio fa extract input.fa -l names.txt

3. Rewrap every record to 60 columns:
   featureio fa extract input.fa -w 60 -o output.fa

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
            Arg::new("names")
                .num_args(0..)
                .index(2)
                .help("Names of the records to extract"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .short('l')
                .num_args(1)
                .help("File of names, one per line"),
        )
        .arg(
            Arg::new("wrap")
                .long("wrap")
                .short('w')
                .num_args(1)
                .default_value("100")
                .value_parser(value_parser!(usize))
                .help("Line width of the sequences, 0 for a single line"),
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

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let wrap = *args.get_one::<usize>("wrap").unwrap();

    let mut names: Vec<String> = match args.get_many::<String>("names") {
        Some(names) => names.cloned().collect(),
        None => vec![],
    };
    if let Some(list) = args.get_one::<String>("list") {
        names.extend(featureio::read_first_column(list)?);
    }

    let mut writer = featureio::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Every record
    //----------------------------
    if names.is_empty() {
        for result in FastaReader::new(featureio::reader(infile)?) {
            write_fasta_record(&result?, &mut writer, wrap)?;
        }
        return Ok(());
    }

    //----------------------------
    // Requested records
    //----------------------------
    let mut wanted: IndexMap<String, Option<Seq>> =
        names.into_iter().map(|name| (name, None)).collect();

    let indexed = infile != "stdin"
        && !featureio::is_gz(infile)
        && index_path(infile).exists();

    if indexed {
        info!("Reading {} through its index", infile);
        let fasta = IndexedFasta::open(infile)?;
        for (name, slot) in wanted.iter_mut() {
            if fasta.contains(name) {
                *slot = Some(fasta.get_sequence(name)?);
            }
        }
    } else {
        debug!("Streaming {}", infile);
        for result in FastaReader::new(featureio::reader(infile)?) {
            let seq = result?;
            if let Some(slot) = wanted.get_mut(seq.name()) {
                if slot.is_none() {
                    *slot = Some(seq);
                }
            }
        }
    }

    let mut found = 0;
    for (name, seq) in &wanted {
        match seq {
            Some(seq) => {
                write_fasta_record(seq, &mut writer, wrap)?;
                found += 1;
            }
            None => warn!("Sequence {} not found in {}", name, infile),
        }
    }

    if found == 0 {
        return Err(anyhow::anyhow!(
            "None of the requested sequences were found in {}",
            infile
        ));
    }

    Ok(())
}
