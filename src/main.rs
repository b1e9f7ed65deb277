use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use catalog::CATALOG;
use cli::{Cli, Commands};
use commands::log::{LogOptions, LogOutcome};
use prompt::{MenuPolicy, Prompter};
use storage::{Backend, Settings};
use types::{Config, OutputFmt};
use utils::{open_url, today};

mod catalog;
mod cli;
mod commands;
mod logging;
mod models;
mod prompt;
mod storage;
mod types;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    CATALOG.validate().context("Tutorial link mapping error")?;

    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    match cli.cmd {
        Some(Commands::Open { resource }) => commands::open::resource(&resource, open_url)?,
        Some(Commands::Template) => commands::open::resource("workout-template", open_url)?,
        Some(Commands::Playlists) => commands::open::playlists(open_url)?,
        Some(Commands::Tutorial { words }) => commands::open::tutorial(&CATALOG, &words, open_url)?,
        Some(Commands::Exercises) => commands::exercises::handle(&CATALOG, fmt)?,
        Some(Commands::Config(cmd)) => commands::config::handle(cmd, &Config::path()?, fmt)?,
        cmd => with_storage(cmd, cli.strict, fmt).await?,
    }

    Ok(())
}

/// Commands that need a backend. The backend is only opened here so the
/// link and config commands work without any storage set up.
async fn with_storage(cmd: Option<Commands>, strict: bool, fmt: OutputFmt) -> Result<()> {
    let cfg = Config::load_default()?;
    let settings = Settings::from_env(&cfg);
    debug!("storage settings: {settings:?}");

    let storage = Backend::open(&settings)
        .await
        .context("Error configuring storage")?;

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match cmd {
        Some(Commands::History) => commands::history::history(&storage, fmt).await?,
        Some(Commands::Search { date }) => commands::history::search(&storage, &date, fmt).await?,
        Some(Commands::Remove) => {
            commands::remove::handle(&storage, &mut prompter).await?;
        }
        _ => {
            let policy = if strict || settings.strict_menus {
                MenuPolicy::Reprompt
            } else {
                MenuPolicy::Fallback
            };
            let opts = LogOptions {
                policy,
                date: today(),
            };
            let outcome =
                commands::log::handle(&storage, &mut prompter, &CATALOG, opts, open_url).await?;
            if let LogOutcome::Logged(entry) = outcome {
                debug!("logged {} {} on {}", entry.exercise, entry.level, entry.date);
            }
        }
    }

    Ok(())
}
