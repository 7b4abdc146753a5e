//! `recall` command line interface.

mod args;
mod commands;
mod error;
mod logging;

use crate::args::Args;
use crate::commands::Status;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use recall_config::Config;
use recall_storage::BackendHandle;
use recall_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_filter());
    match run(&args) {
        Ok(Status::Complete) => ExitCode::SUCCESS,
        Ok(Status::Partial) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<Status> {
    let config = args.apply(Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?);
    let cache = cache_backend(&config)?;
    let mut stdout = std::io::stdout().lock();
    commands::run(&args.command, cache, &mut stdout)
}

fn cache_backend(config: &Config) -> Result<BackendHandle> {
    let root = std::path::absolute(&config.cache_dir).or_raise(|| ErrorKind::Storage)?;
    tracing::debug!(root = %root.display(), dry_run = config.dry_run, "Opening cache directory");
    let local: BackendHandle = Arc::new(LocalBackend::new("cache", root).or_raise(|| ErrorKind::Storage)?);
    Ok(match config.dry_run {
        true => Arc::new(ReadOnlyBackend::new(local)),
        false => local,
    })
}
