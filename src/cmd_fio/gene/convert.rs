use clap::builder::PossibleValuesParser;
use clap::*;
use log::{info, warn};

use featureio::libs::fmt::{
    self, Bed12Writer, ExonHintWriter, GeneWriter, Gff3Writer, InputFormat, OutputFormat,
};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("convert")
        .about("Converts gene models between formats")
        .after_help(
            r###"
This command reads gene models in one format and writes them in another.

Input formats (--from):
* bed12       - BED with 12 columns
* psl         - PSL alignments, the target side becomes the gene
* blatpsl     - PSL with the 5-line header written by BLAT
* augustusgtf - AUGUSTUS predictions, transcript by transcript

Output formats (--to):
* bed12               - BED with 12 columns
* augustus_exon_hints - hints for AUGUSTUS, one line per coding exon
* gff3                - GFF3 with gene, mRNA, exon and CDS features

Options:
* --source sets the source column of hints and GFF3
* --all-exons makes hints of whole exons instead of their coding parts.
  PSL alignments have no coding parts, so hints from them need it

Notes:
* Hints and GFF3 are 1-based, BED and PSL are 0-based
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'

Examples:
1. BLAT alignments as AUGUSTUS hints:
   featureio gene convert hits.psl --from blatpsl --to augustus_exon_hints

2. AUGUSTUS predictions as GFF3:
   featureio gene convert augustus.gtf --from augustusgtf --to gff3 -o genes.gff3

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input file to process"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .required(true)
                .num_args(1)
                .value_parser(PossibleValuesParser::new(InputFormat::NAMES))
                .help("Format of the input"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .required(true)
                .num_args(1)
                .value_parser(PossibleValuesParser::new(OutputFormat::NAMES))
                .help("Format of the output"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .num_args(1)
                .help("Source column of hint and GFF3 lines"),
        )
        .arg(
            Arg::new("all_exons")
                .long("all-exons")
                .action(ArgAction::SetTrue)
                .help("Hint whole exons, not only their coding parts"),
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
    let from: InputFormat = args.get_one::<String>("from").unwrap().parse()?;
    let to: OutputFormat = args.get_one::<String>("to").unwrap().parse()?;
    let source = args.get_one::<String>("source");

    if matches!(from, InputFormat::Psl | InputFormat::BlatPsl)
        && to == OutputFormat::AugustusExonHints
        && !args.get_flag("all_exons")
    {
        warn!("PSL records carry no coding regions, so no hints will be written without --all-exons");
    }

    let mut gene_writer: Box<dyn GeneWriter> = match to {
        OutputFormat::Bed12 => Box::new(Bed12Writer),
        OutputFormat::AugustusExonHints => {
            let mut hints = ExonHintWriter {
                cds_exons: !args.get_flag("all_exons"),
                ..Default::default()
            };
            if let Some(source) = source {
                hints.source = source.to_string();
            }
            Box::new(hints)
        }
        OutputFormat::Gff3 => match source {
            Some(source) => Box::new(Gff3Writer::new(source)),
            None => Box::new(Gff3Writer::default()),
        },
    };

    let reader = featureio::reader(infile)?;
    let mut writer = featureio::writer(args.get_one::<String>("outfile").unwrap())?;

    gene_writer.write_header(writer.as_mut())?;
    let mut count = 0;
    for gene in fmt::parse(reader, from) {
        gene_writer.write_gene(writer.as_mut(), &gene?)?;
        count += 1;
    }
    gene_writer.write_footer(writer.as_mut())?;

    info!("Converted {} genes of {}", count, infile);

    Ok(())
}
