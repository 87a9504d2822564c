use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use follow_scout::{
    configuration::get_configuration,
    startup::{run, RunOptions},
};

/// Collect the companies each profile follows into a CSV and a sheet.
#[derive(Parser)]
#[command(name = "follow_scout", version)]
struct Cli {
    /// Configuration file (default: configuration.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one profile handle per line
    #[arg(long)]
    handles: Option<PathBuf>,

    /// Where to write this run's CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip pushing rows to the sheet
    #[arg(long)]
    no_sheet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut configuration = get_configuration(cli.config)?;
    if let Some(handles) = cli.handles {
        configuration.run.handles_path = handles;
    }
    if let Some(output) = cli.output {
        configuration.run.output_path = output;
    }

    run(
        configuration,
        RunOptions {
            push_to_sheet: !cli.no_sheet,
        },
    )
    .await
}
