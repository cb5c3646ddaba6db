//! SkyQuery CLI
//!
//! Conversational weather queries in the terminal.

mod cli;
mod session;
mod shell;

use anyhow::Context;
use clap::Parser;
use infrastructure::{AppConfig, Credentials, ENV_PREFIX, EnvSecretStore, init_logging};
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;

use crate::{
    cli::{Cli, Commands},
    shell::local_now,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    let credentials = Credentials::load(&EnvSecretStore::with_prefix(ENV_PREFIX))
        .await
        .context("Set SKYQUERY_LLM_API_KEY and SKYQUERY_WEATHER_API_KEY")?;

    let mut session = session::build(&config, &credentials).context("Failed to start session")?;
    let mut out = stdout();

    match cli.command() {
        Commands::Chat => {
            info!("Starting interactive session");
            shell::run_chat(&mut session, BufReader::new(stdin()), &mut out, local_now).await?;
        },
        command @ Commands::Ask { .. } => {
            let question = command.question().unwrap_or_default();
            shell::run_once(&mut session, &question, &mut out, local_now()).await?;
        },
    }

    Ok(())
}
