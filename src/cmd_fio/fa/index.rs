use clap::*;
use log::info;

use featureio::libs::fai::{index_fasta, index_path, write_index};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("index")
        .about("Builds a .fai index of a FASTA file")
        .after_help(
            r###"
This command writes a samtools-compatible index, one line per record:
name, length, offset of the first base, bases per line and bytes per line.

The index is written to <infile>.fai unless -o is given. Records must use one
line length throughout, except for their last line.

Notes:
* Gzipped files can not be indexed. Decompress them first

Examples:
1. Write input.fa.fai:
   featureio fa index input.fa

2. Print the index:
   featureio fa index input.fa -o stdout

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
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .help("Output filename. [stdout] for screen. Defaults to <infile>.fai"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let outfile = match args.get_one::<String>("outfile") {
        Some(outfile) => outfile.to_string(),
        None => index_path(infile).display().to_string(),
    };

    let records = index_fasta(infile)?;
    info!("Indexed {} records of {}", records.len(), infile);

    let mut writer = featureio::writer(&outfile)?;
    write_index(&records, &mut writer)?;

    Ok(())
}
