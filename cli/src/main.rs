mod add;
mod changelog;
mod check;
mod cli;
mod error;
mod progress;
mod settings;
mod ui;
mod vcs;

use ::changelog::ChangelogConfig;
use clap::Parser;
use cli::{Cli, Commands, GlobalArgs};
use colored::Colorize;
use error::Result;
use settings::Settings;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        if let Some(hint) = err.hint() {
            ui::hint_message(&hint);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.global)?;
    let path = PathBuf::from(&config.changelog_file);

    match cli.command {
        Commands::Check => check::execute(&config, cli.global.verbose),
        Commands::Add { category, message } => add::execute(&path, category, message),
        Commands::Init => Ok(changelog::init(&path, &config)?),
        Commands::Show => Ok(changelog::show(&path)?),
    }
}

fn load_config(global: &GlobalArgs) -> Result<ChangelogConfig> {
    let mut config = Settings::load(global.config.as_deref())?.apply(ChangelogConfig::default());
    if let Some(file) = &global.file {
        config.changelog_file = file.to_string_lossy().into_owned();
    }
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
