//! `jobtracker` command-line front end.
//!
//! A thin view over the job store: it parses arguments, validates form
//! input, calls the store and query utilities, and prints the results.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use jobtracker_applications::{ApplicationStatus, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT, SortOrder, StatusFilter};
use jobtracker_core::JobId;
use jobtracker_observability::LogFormat;

pub mod commands;

/// Track job applications from the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "jobtracker", version)]
pub struct Cli {
    /// Directory holding the persisted collection. Falls back to
    /// `JOBTRACKER_DATA_DIR`, then the platform data directory.
    #[arg(long = "data-dir", value_name = "path", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log output format (`json` or `pretty`).
    #[arg(long = "log-format", value_name = "format", default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record a new application.
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        role: String,
        /// Application date (YYYY-MM-DD); must not be in the future.
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: NaiveDate,
        #[arg(long, default_value_t = ApplicationStatus::Applied)]
        status: ApplicationStatus,
    },
    /// Change fields of an existing application.
    Edit {
        id: JobId,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    /// Remove an application.
    Delete { id: JobId },
    /// Print a single application.
    Show { id: JobId },
    /// List applications with optional filter, search and ordering.
    List {
        /// `All` or one of Applied, Interview, Selected, Rejected.
        #[arg(long, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Case-insensitive match on company name or job role.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = SortOrder::Desc)]
        order: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long = "per-page", default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    /// Show counts per status.
    Stats,
    /// Show the most recent applications.
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Write all applications to `job-applications-<date>.csv`.
    Export {
        #[arg(long, value_name = "dir", default_value = ".")]
        out: PathBuf,
    },
}
