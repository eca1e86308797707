//! Per-status counts for dashboards.

use serde::{Deserialize, Serialize};

use crate::record::{ApplicationStatus, JobRecord};

/// Record counts by status.
///
/// Records whose stored status label is not recognized count toward `total`
/// only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub total: usize,
    pub applied: usize,
    pub interview: usize,
    pub selected: usize,
    pub rejected: usize,
}

impl JobStats {
    pub fn count_for(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Applied => self.applied,
            ApplicationStatus::Interview => self.interview,
            ApplicationStatus::Selected => self.selected,
            ApplicationStatus::Rejected => self.rejected,
        }
    }
}

/// Count records per status in a single pass.
pub fn compute_stats(records: &[JobRecord]) -> JobStats {
    records.iter().fold(
        JobStats {
            total: records.len(),
            ..JobStats::default()
        },
        |mut stats, record| {
            match record.status() {
                Some(ApplicationStatus::Applied) => stats.applied += 1,
                Some(ApplicationStatus::Interview) => stats.interview += 1,
                Some(ApplicationStatus::Selected) => stats.selected += 1,
                Some(ApplicationStatus::Rejected) => stats.rejected += 1,
                None => {}
            }
            stats
        },
    )
}
