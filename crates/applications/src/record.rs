use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use jobtracker_core::{DomainError, Entity, JobId};

/// Application stage of a job record.
///
/// Labels are persisted and compared exactly as written (case-sensitive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    /// All statuses, in the order views list them.
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Selected => "Selected",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown application status: {s:?}")))
    }
}

/// Status label as stored on a record.
///
/// Labels this build does not know are kept verbatim so they survive the
/// next write of the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredStatus {
    Known(ApplicationStatus),
    Unrecognized(String),
}

impl StoredStatus {
    fn as_str(&self) -> &str {
        match self {
            StoredStatus::Known(status) => status.as_str(),
            StoredStatus::Unrecognized(label) => label,
        }
    }
}

impl Default for StoredStatus {
    fn default() -> Self {
        StoredStatus::Known(ApplicationStatus::default())
    }
}

impl Serialize for StoredStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StoredStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match crate::lenient::optional_text(deserializer)? {
            None => StoredStatus::default(),
            Some(label) => match label.parse() {
                Ok(status) => StoredStatus::Known(status),
                Err(_) => StoredStatus::Unrecognized(label),
            },
        })
    }
}

/// Parse a stored application date.
///
/// Accepts plain calendar dates (`YYYY-MM-DD`, what forms submit) and full
/// RFC 3339 timestamps. Anything else yields `None`.
pub fn parse_application_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// A job application entry.
///
/// `id` and `created_at` are fixed when the record is built and are never
/// touched by [`JobRecord::apply_patch`]. Only `id` is required when decoding:
/// missing or `null` text reads as `""`, a missing status as `Applied`, and a
/// `createdAt` that is neither RFC 3339 nor epoch milliseconds as the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    id: JobId,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    company_name: String,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    job_role: String,
    #[serde(default, deserialize_with = "crate::lenient::text")]
    application_date: String,
    #[serde(default)]
    status: StoredStatus,
    #[serde(default, deserialize_with = "crate::lenient::timestamp")]
    created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Build a record from submitted form fields.
    ///
    /// A draft without a status gets the default (`Applied`).
    pub fn new(id: JobId, draft: JobDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            company_name: draft.company_name,
            job_role: draft.job_role,
            application_date: draft.application_date,
            status: StoredStatus::Known(draft.status.unwrap_or_default()),
            created_at,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn job_role(&self) -> &str {
        &self.job_role
    }

    /// The application date exactly as submitted.
    pub fn application_date(&self) -> &str {
        &self.application_date
    }

    /// The application date parsed for ordering, if it is a valid date.
    pub fn application_timestamp(&self) -> Option<NaiveDateTime> {
        parse_application_date(&self.application_date)
    }

    /// The status, or `None` when the stored label is not one this build knows.
    pub fn status(&self) -> Option<ApplicationStatus> {
        match &self.status {
            StoredStatus::Known(status) => Some(*status),
            StoredStatus::Unrecognized(_) => None,
        }
    }

    /// The status label exactly as stored.
    pub fn status_label(&self) -> &str {
        self.status.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Shallow-merge a patch over the editable fields.
    pub fn apply_patch(&mut self, patch: JobPatch) {
        if let Some(company_name) = patch.company_name {
            self.company_name = company_name;
        }
        if let Some(job_role) = patch.job_role {
            self.job_role = job_role;
        }
        if let Some(application_date) = patch.application_date {
            self.application_date = application_date;
        }
        if let Some(status) = patch.status {
            self.status = StoredStatus::Known(status);
        }
    }

    /// The editable fields, as a form would be pre-filled when editing.
    ///
    /// An unrecognized status leaves the draft's status empty.
    pub fn to_draft(&self) -> JobDraft {
        JobDraft {
            company_name: self.company_name.clone(),
            job_role: self.job_role.clone(),
            application_date: self.application_date.clone(),
            status: self.status(),
        }
    }
}

impl Entity for JobRecord {
    type Id = JobId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw form input for a new record.
///
/// Fields are kept as submitted; run [`crate::validate`] before handing a
/// draft to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub application_date: String,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl JobDraft {
    pub fn new(
        company_name: impl Into<String>,
        job_role: impl Into<String>,
        application_date: impl Into<String>,
        status: ApplicationStatus,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            job_role: job_role.into(),
            application_date: application_date.into(),
            status: Some(status),
        }
    }
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            job_role: String::new(),
            application_date: String::new(),
            status: Some(ApplicationStatus::default()),
        }
    }
}

/// Partial update: `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub application_date: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.job_role.is_none()
            && self.application_date.is_none()
            && self.status.is_none()
    }

    /// Merge this patch over a draft, so the merged result can be validated
    /// before an update is issued.
    pub fn apply_to_draft(&self, draft: &JobDraft) -> JobDraft {
        JobDraft {
            company_name: self
                .company_name
                .clone()
                .unwrap_or_else(|| draft.company_name.clone()),
            job_role: self.job_role.clone().unwrap_or_else(|| draft.job_role.clone()),
            application_date: self
                .application_date
                .clone()
                .unwrap_or_else(|| draft.application_date.clone()),
            status: self.status.or(draft.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_id() -> JobId {
        "job-1".parse().unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap()
    }

    fn test_record() -> JobRecord {
        JobRecord::new(
            test_id(),
            JobDraft::new("Google", "SWE", "2024-01-10", ApplicationStatus::Applied),
            test_time(),
        )
    }

    #[test]
    fn status_parse_is_case_sensitive() {
        assert_eq!(
            "Interview".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Interview
        );
        let err = "interview".parse::<ApplicationStatus>().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for lowercase status"),
        }
    }

    #[test]
    fn new_record_defaults_missing_status_to_applied() {
        let draft = JobDraft {
            status: None,
            ..JobDraft::new("Acme", "Engineer", "2024-03-01", ApplicationStatus::Rejected)
        };
        let record = JobRecord::new(test_id(), draft, test_time());
        assert_eq!(record.status(), Some(ApplicationStatus::Applied));
    }

    #[test]
    fn apply_patch_merges_only_supplied_fields() {
        let mut record = test_record();
        record.apply_patch(JobPatch {
            status: Some(ApplicationStatus::Interview),
            ..JobPatch::default()
        });

        assert_eq!(record.status(), Some(ApplicationStatus::Interview));
        assert_eq!(record.company_name(), "Google");
        assert_eq!(record.job_role(), "SWE");
        assert_eq!(record.id(), &test_id());
        assert_eq!(record.created_at(), test_time());
    }

    #[test]
    fn empty_patch_leaves_record_unchanged() {
        let mut record = test_record();
        let before = record.clone();
        assert!(JobPatch::default().is_empty());
        record.apply_patch(JobPatch::default());
        assert_eq!(record, before);
    }

    #[test]
    fn patch_over_draft_reflects_merged_form() {
        let record = test_record();
        let patch = JobPatch {
            company_name: Some("  ".to_string()),
            ..JobPatch::default()
        };
        let merged = patch.apply_to_draft(&record.to_draft());
        assert_eq!(merged.company_name, "  ");
        assert_eq!(merged.job_role, "SWE");
        assert_eq!(merged.status, Some(ApplicationStatus::Applied));
    }

    #[test]
    fn persisted_layout_uses_camel_case_string_fields() {
        let value = serde_json::to_value(test_record()).unwrap();
        assert_eq!(value["id"], "job-1");
        assert_eq!(value["companyName"], "Google");
        assert_eq!(value["jobRole"], "SWE");
        assert_eq!(value["applicationDate"], "2024-01-10");
        assert_eq!(value["status"], "Applied");
        assert!(value["createdAt"].as_str().unwrap().starts_with("2024-01-10T09:30:00"));
    }

    #[test]
    fn decoding_tolerates_extra_and_missing_fields() {
        let record: JobRecord = serde_json::from_str(
            r#"{"id":"1704880000000","companyName":"Meta","notes":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(record.id().as_str(), "1704880000000");
        assert_eq!(record.company_name(), "Meta");
        assert_eq!(record.job_role(), "");
        assert_eq!(record.status(), Some(ApplicationStatus::Applied));
        assert_eq!(record.created_at(), DateTime::<Utc>::default());
    }

    #[test]
    fn decodes_javascript_iso_timestamps() {
        let record: JobRecord = serde_json::from_str(
            r#"{"id":"1","companyName":"A","jobRole":"B","applicationDate":"2024-02-05","status":"Selected","createdAt":"2024-02-05T10:11:12.345Z"}"#,
        )
        .unwrap();
        assert_eq!(record.status(), Some(ApplicationStatus::Selected));
        assert_eq!(
            record.created_at(),
            Utc.with_ymd_and_hms(2024, 2, 5, 10, 11, 12).unwrap()
                + chrono::Duration::milliseconds(345)
        );
    }

    #[test]
    fn decoding_reads_null_and_numeric_fields_leniently() {
        let record: JobRecord = serde_json::from_str(
            r#"{"id":"7","companyName":null,"jobRole":42,"applicationDate":null,"status":null,"createdAt":1704880000000}"#,
        )
        .unwrap();
        assert_eq!(record.company_name(), "");
        assert_eq!(record.job_role(), "42");
        assert_eq!(record.application_date(), "");
        assert_eq!(record.status(), Some(ApplicationStatus::Applied));
        assert_eq!(
            record.created_at(),
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 46, 40).unwrap()
        );

        let record: JobRecord =
            serde_json::from_str(r#"{"id":"8","createdAt":"last tuesday"}"#).unwrap();
        assert_eq!(record.created_at(), DateTime::<Utc>::default());
    }

    #[test]
    fn unknown_status_label_is_kept_verbatim() {
        let mut record: JobRecord =
            serde_json::from_str(r#"{"id":"9","companyName":"Stripe","status":"Offer"}"#).unwrap();
        assert_eq!(record.status(), None);
        assert_eq!(record.status_label(), "Offer");
        assert_eq!(record.to_draft().status, None);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "Offer");

        record.apply_patch(JobPatch {
            status: Some(ApplicationStatus::Selected),
            ..JobPatch::default()
        });
        assert_eq!(record.status_label(), "Selected");
    }

    #[test]
    fn decoding_rejects_blank_ids() {
        let err = serde_json::from_str::<JobRecord>(r#"{"id":"  ","companyName":"A"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn application_date_parsing() {
        assert!(parse_application_date("2024-01-10").is_some());
        assert!(parse_application_date("2024-01-10T08:00:00Z").is_some());
        assert!(parse_application_date("not a date").is_none());
        assert!(parse_application_date("").is_none());
    }
}
