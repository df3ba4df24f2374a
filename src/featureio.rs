extern crate clap;
use clap::*;

mod cmd_fio;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = Command::new("featureio")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`featureio` - FASTA and gene feature toolkit")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_fio::fa::make_subcommand())
        .subcommand(cmd_fio::gene::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Sequences:
    * fa   - FASTA operations: extract, substr, stat, index

* Gene features:
    * gene - Gene models: convert formats, extract sequences

Set RUST_LOG=info (or debug) for progress messages on stderr.

"###,
        );

    match app.get_matches().subcommand() {
        Some(("fa", sub_matches)) => cmd_fio::fa::execute(sub_matches),
        Some(("gene", sub_matches)) => cmd_fio::gene::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
