//! Job applications domain module.
//!
//! This crate contains the job-application record model, the form validation
//! contract, and the pure query/transform utilities consumed by views
//! (filtering, search, sorting, pagination, statistics, CSV export).
//! Everything here is deterministic domain logic (no IO, no storage).

pub mod export;
mod lenient;
pub mod query;
pub mod record;
pub mod stats;
pub mod validation;

pub use export::{CSV_HEADER, ExportError, export_file_name, to_csv};
pub use query::{
    DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT, JobQuery, Page, SortOrder, StatusFilter,
    filter_by_status, paginate, recent, search, sort_by_date,
};
pub use record::{ApplicationStatus, JobDraft, JobPatch, JobRecord};
pub use stats::{JobStats, compute_stats};
pub use validation::{Field, ValidationErrors, ensure_not_in_future, validate};
