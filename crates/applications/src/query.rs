//! Query utilities over job records.
//!
//! Every function here is pure: it borrows the input and returns a new
//! sequence, leaving the input untouched.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use jobtracker_core::DomainError;

use crate::record::{ApplicationStatus, JobRecord};

/// Page size of the full listing view.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Number of entries in the "recent applications" list.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Status filter: everything, or exactly one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl From<ApplicationStatus> for StatusFilter {
    fn from(status: ApplicationStatus) -> Self {
        StatusFilter::Only(status)
    }
}

impl core::str::FromStr for StatusFilter {
    type Err = DomainError;

    /// `""` and `"All"` select everything; any other value must be an exact
    /// status label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "All" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

impl core::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => core::fmt::Display::fmt(status, f),
        }
    }
}

/// Ordering by application date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl core::str::FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DomainError::validation(format!(
                "sort order must be \"asc\" or \"desc\", got {s:?}"
            ))),
        }
    }
}

impl core::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Keep records with the given status; `All` keeps everything in order.
pub fn filter_by_status(records: &[JobRecord], filter: StatusFilter) -> Vec<JobRecord> {
    match filter {
        StatusFilter::All => records.to_vec(),
        StatusFilter::Only(status) => records
            .iter()
            .filter(|record| record.status() == Some(status))
            .cloned()
            .collect(),
    }
}

/// Case-insensitive substring match on company name or job role.
///
/// An empty term matches everything.
pub fn search(records: &[JobRecord], term: &str) -> Vec<JobRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.company_name().to_lowercase().contains(&needle)
                || record.job_role().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Stable sort by application date.
///
/// Records whose date does not parse sort as the earliest possible date:
/// last under `Desc`, first under `Asc`.
pub fn sort_by_date(records: &[JobRecord], order: SortOrder) -> Vec<JobRecord> {
    let mut sorted = records.to_vec();
    // sort_by_cached_key is stable, so equal dates keep their input order.
    match order {
        SortOrder::Asc => sorted.sort_by_cached_key(|record| record.application_timestamp()),
        SortOrder::Desc => {
            sorted.sort_by_cached_key(|record| Reverse(record.application_timestamp()))
        }
    }
    sorted
}

/// The `limit` most recent applications, newest first.
pub fn recent(records: &[JobRecord], limit: usize) -> Vec<JobRecord> {
    let mut sorted = sort_by_date(records, SortOrder::Desc);
    sorted.truncate(limit);
    sorted
}

/// Listing query: status filter, then search, then date sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub status: StatusFilter,
    pub search: Option<String>,
    pub order: SortOrder,
}

impl JobQuery {
    pub fn apply(&self, records: &[JobRecord]) -> Vec<JobRecord> {
        let filtered = filter_by_status(records, self.status);
        let matched = search(&filtered, self.search.as_deref().unwrap_or_default());
        sort_by_date(&matched, self.order)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub items: Vec<JobRecord>,
    /// 1-based page number that was requested.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out a 1-based page. Page 0 is treated as page 1, a zero page size
/// as 1, and pages past the end are empty.
pub fn paginate(records: &[JobRecord], page: usize, per_page: usize) -> Page {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = records.len();
    let start = (page - 1).saturating_mul(per_page);

    let items = records
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        page,
        total_pages: total_items.div_ceil(per_page),
        total_items,
    }
}
