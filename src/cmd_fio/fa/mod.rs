pub mod extract;
pub mod index;
pub mod stat;
pub mod substr;

pub fn make_subcommand() -> clap::Command {
    clap::Command::new("fa")
        .about("Fasta tools")
        .subcommand_required(true)
        .subcommand(extract::make_subcommand())
        .subcommand(index::make_subcommand())
        .subcommand(stat::make_subcommand())
        .subcommand(substr::make_subcommand())
}

pub fn execute(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("extract", sub_matches)) => extract::execute(sub_matches),
        Some(("index", sub_matches)) => index::execute(sub_matches),
        Some(("stat", sub_matches)) => stat::execute(sub_matches),
        Some(("substr", sub_matches)) => substr::execute(sub_matches),
        _ => Ok(()),
    }
}
