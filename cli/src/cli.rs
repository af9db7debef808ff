use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chlog")]
#[command(
    author,
    version,
    about = "Keep a Changelog gate: validate CHANGELOG.md in CI and add entries to it"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output with additional information
    #[clap(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Changelog file to work on (defaults to the configured file, CHANGELOG.md)
    #[clap(long, global = true)]
    pub file: Option<PathBuf>,

    /// Settings file (defaults to .chlog.toml when present)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the changelog; in merge request pipelines also require an entry for source changes
    Check,

    /// Add an entry to the Unreleased section (prompts for anything not given)
    Add {
        /// Category: added, changed, deprecated, removed, fixed or security
        #[clap(short, long)]
        category: Option<String>,

        /// Entry text
        #[clap(short, long)]
        message: Option<String>,
    },

    /// Create a new changelog with an empty Unreleased section
    Init,

    /// Show the entries of the Unreleased section
    Show,
}
