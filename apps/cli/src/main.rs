mod cli;
mod commands;
mod main_lib;

use clap::Parser;
use cli::{Cli, Command};
use main_lib::init_tracing;
use regression_core::config::RegressionConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Cli::parse();
    let config = RegressionConfig::from_env()?;
    tracing::debug!("Configuration: {:?}", config);

    match args.command {
        Command::Dump {
            db,
            output,
            previous,
        } => commands::dump(&db, &output, previous.as_deref()).await,
        Command::Restore { input, db } => commands::restore(&input, &db).await,
        Command::Compare {
            base,
            test,
            delta,
            properties,
            report,
        } => commands::compare(&base, &test, delta, properties, report.as_deref(), &config),
        Command::Show { golden_copy } => commands::show(&golden_copy),
    }
}
