use clap::{ArgAction, Parser, Subcommand};
use recall_config::Config;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recall", version, about = "Local disk cache for notes and transcripts")]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Cache directory, overriding the configuration
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
    /// Don't write anything to the cache directory
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// More logging (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Cache every text file in a directory
    Import { dir: PathBuf },
    /// List cached document keys
    List,
    /// Print one cached document without loading the rest
    Show {
        /// Cache key, or a document identity to derive it from
        key: String,
    },
    /// Load every cached document and report failures
    Load,
    /// Print the cache key for a document identity
    Key { identity: String },
}

impl Args {
    /// Command-line flags win over the loaded configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = cache_dir.clone();
        }
        config.dry_run |= self.dry_run;
        config
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
