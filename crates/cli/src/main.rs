use std::io;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use jobtracker_cli::{Cli, commands};
use jobtracker_infra::StoreConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    jobtracker_observability::init_with(cli.log_format);

    let mut config = StoreConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::debug!(data_dir = %config.data_dir.display(), key = %config.storage_key, "opening job store");

    let mut store = config.open_store();
    let today = Utc::now().date_naive();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, &mut store, &mut out, today).context("jobtracker command failed")
}
