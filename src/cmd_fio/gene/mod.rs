pub mod convert;
pub mod seq;

pub fn make_subcommand() -> clap::Command {
    clap::Command::new("gene")
        .about("Gene feature tools")
        .subcommand_required(true)
        .subcommand(convert::make_subcommand())
        .subcommand(seq::make_subcommand())
}

pub fn execute(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("convert", sub_matches)) => convert::execute(sub_matches),
        Some(("seq", sub_matches)) => seq::execute(sub_matches),
        _ => Ok(()),
    }
}
