use clap::builder::PossibleValuesParser;
use clap::*;
use log::{debug, warn};

use featureio::libs::fai::IndexedFastaCollection;
use featureio::libs::fmt::{self, InputFormat};
use featureio::libs::seq::{write_fasta_record, Seq};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("seq")
        .about("Extracts spliced gene sequences")
        .after_help(
            r###"
This command writes the spliced sequence of every gene as a FASTA record named
after the gene. Exons are joined in coordinate order, and genes on the minus
strand are reverse complemented.

The genome may be split over several FASTA files. Each needs a .fai index
(see `featureio fa index`), and a sequence name may appear in only one of them.

Notes:
* Genes on sequences missing from the FASTA files are reported and skipped
* With --cds, genes without a coding part are reported and skipped

Examples:
1. Transcripts of BED12 models:
   featureio gene seq genes.bed --from bed12 --fasta genome.fa

2. Coding sequences of AUGUSTUS predictions, genome in two files:
   featureio gene seq augustus.gtf --from augustusgtf --fasta chr1.fa chr2.fa --cds

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input file of gene models"),
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
            Arg::new("fasta")
                .long("fasta")
                .required(true)
                .num_args(1..)
                .help("Indexed FASTA file(s) of the genome"),
        )
        .arg(
            Arg::new("cds")
                .long("cds")
                .action(ArgAction::SetTrue)
                .help("Coding sequence only"),
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
    let from: InputFormat = args.get_one::<String>("from").unwrap().parse()?;
    let fastas: Vec<&String> = args.get_many::<String>("fasta").unwrap().collect();
    let is_cds = args.get_flag("cds");
    let wrap = *args.get_one::<usize>("wrap").unwrap();

    let genome = IndexedFastaCollection::open(&fastas)?;
    debug!("{} sequences in {} files", genome.len(), fastas.len());

    let reader = featureio::reader(infile)?;
    let mut writer = featureio::writer(args.get_one::<String>("outfile").unwrap())?;

    // genes usually come sorted, so keep the last chromosome around
    let mut cached: Option<Seq> = None;

    for gene in fmt::parse(reader, from) {
        let gene = gene?;

        if !genome.contains(&gene.chrom) {
            warn!("{} is on {}, which is not in the FASTA files", gene.name, gene.chrom);
            continue;
        }
        if cached.as_ref().map(|s| s.name()) != Some(gene.chrom.as_str()) {
            cached = Some(genome.get_sequence(&gene.chrom)?);
        }
        let Some(chrom) = cached.as_ref() else {
            continue;
        };

        let bases = if is_cds {
            gene.cds_seq(chrom.sequence())?
        } else {
            gene.exon_seq(chrom.sequence())?
        };
        if bases.is_empty() {
            warn!("{} has no sequence to write", gene.name);
            continue;
        }

        write_fasta_record(&Seq::new(&gene.name, &bases, None), &mut writer, wrap)?;
    }

    Ok(())
}
