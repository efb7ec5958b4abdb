mod cli;
mod logging;
mod report;
mod runner;
mod settings;

use clap::Parser;
use picsmaller_logging::pipeline_info;

use cli::Cli;
use runner::RunPlan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.level());
    pipeline_info!("Starting picsmaller");

    let settings = settings::load(cli.settings.as_deref())?;
    let (options, archive) = settings.resolve(&cli)?;

    runner::run(RunPlan {
        inputs: cli.inputs,
        out: cli.out,
        options,
        archive,
        each: cli.each,
        archive_enabled: !cli.no_archive,
    })
    .await
}
