use clap::*;
use log::debug;
use std::io::Write;

use featureio::libs::seq::skip_to_header;
use featureio::libs::stat::{SeqStat, Summary};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("stat")
        .about("Reports lengths and composition of FASTA records")
        .after_help(
            r###"
This command reports one tab-separated line per record: the length, then the
name.

Options:
* --gc appends the GC fraction of the record, with Ns left out of the
  denominator
* --summary replaces the per-record lines with a header and a single row:
  count, total, min, max, mean, n50 and gc over all records of all files

Notes:
* Text ahead of the first header and whitespace inside sequences are ignored
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'

Examples:
1. Lengths of all records:
   featureio fa stat input.fa

2. Lengths and GC of several files:
   featureio fa stat input1.fa input2.fa.gz --gc

3. One summary line:
   featureio fa stat input.fa --summary

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Input FASTA file(s) to process"),
        )
        .arg(
            Arg::new("gc")
                .long("gc")
                .action(ArgAction::SetTrue)
                .help("Append the GC fraction"),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .action(ArgAction::SetTrue)
                .help("Report totals instead of one line per record"),
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
    let mut writer = featureio::writer(args.get_one::<String>("outfile").unwrap())?;
    let with_gc = args.get_flag("gc");
    let is_summary = args.get_flag("summary");

    let mut summary = Summary::new();

    for infile in args.get_many::<String>("infiles").unwrap() {
        debug!("Reading {}", infile);
        let mut reader = featureio::reader(infile)?;
        skip_to_header(&mut reader)?;
        let mut fa_in = noodles_fasta::io::Reader::new(reader);

        for result in fa_in.records() {
            let record = result?;
            let name = String::from_utf8(record.name().into())?;
            // whitespace inside sequence lines is not sequence
            let seq: Vec<u8> = record
                .sequence()
                .get(..)
                .unwrap_or_default()
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();

            if is_summary {
                summary.add(&seq);
                continue;
            }

            let stat = SeqStat::new(&name, &seq);
            if with_gc {
                writer.write_fmt(format_args!(
                    "{}\t{}\t{:.4}\n",
                    stat.length, stat.name, stat.gc
                ))?;
            } else {
                writer.write_fmt(format_args!("{}\t{}\n", stat.length, stat.name))?;
            }
        }
    }

    if is_summary {
        writer.write_fmt(format_args!("{}\n{}\n", Summary::header(), summary.to_row()))?;
    }

    Ok(())
}
