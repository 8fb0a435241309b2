//! CLI argument definitions using clap

use clap::{ArgAction, ArgGroup, Parser};

use crate::domain::Operation;

const CONFIGURATION_HELP: &str = "\
Configuration (highest precedence first):
  DENG_CATALOG_DIR               catalog directory override
  ~/.deng-toolkit/config.yaml    keys: catalog_dir, catalog_remote
  default                        ~/data-catalog, no remote

Mutating operations require the catalog directory to be inside $HOME or the
temporary directory.";

/// Keep the local data catalog in sync with the team git remote
#[derive(Parser, Debug, Default)]
#[command(name = "catalog-sync")]
#[command(author, version, about, long_about = None)]
#[command(after_help = CONFIGURATION_HELP)]
#[command(group(
    ArgGroup::new("operation")
        .args(["status", "init", "push", "pull", "full"])
        .multiple(false)
))]
pub struct Cli {
    /// Show catalog configuration and sync state (default)
    #[arg(long)]
    pub status: bool,

    /// Create the catalog repository (no-op if it exists)
    #[arg(long)]
    pub init: bool,

    /// Commit all changes and push to the remote
    #[arg(long, visible_alias = "git")]
    pub push: bool,

    /// Pull changes from the remote
    #[arg(long)]
    pub pull: bool,

    /// Pull, then push
    #[arg(long)]
    pub full: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Operation selected by the flags; no flag means status.
    pub fn operation(&self) -> Operation {
        if self.init {
            Operation::Init
        } else if self.push {
            Operation::Push
        } else if self.pull {
            Operation::Pull
        } else if self.full {
            Operation::Full
        } else {
            Operation::Status
        }
    }
}
