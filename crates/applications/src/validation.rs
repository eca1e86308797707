//! Form validation contract.
//!
//! Validation returns data, never an error: an empty [`ValidationErrors`]
//! means every field is acceptable, and a field without an entry is valid.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use jobtracker_core::DomainError;

use crate::record::{JobDraft, parse_application_date};

pub const COMPANY_NAME_REQUIRED: &str = "Company name is required";
pub const JOB_ROLE_REQUIRED: &str = "Job role is required";
pub const APPLICATION_DATE_REQUIRED: &str = "Application date is required";
pub const STATUS_REQUIRED: &str = "Status is required";
pub const APPLICATION_DATE_IN_FUTURE: &str = "Application date cannot be in the future";

/// A form field that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CompanyName,
    JobRole,
    ApplicationDate,
    Status,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CompanyName => "companyName",
            Field::JobRole => "jobRole",
            Field::ApplicationDate => "applicationDate",
            Field::Status => "status",
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping of field to error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Merge another set of errors; entries from `other` win on conflict.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// `Ok(())` when empty, otherwise a single `DomainError::Validation`
    /// listing every failing field.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Ok(());
        }
        let joined = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(DomainError::validation(joined))
    }
}

/// Check a candidate record for field completeness.
///
/// All checks run; none short-circuits.
pub fn validate(candidate: &JobDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if candidate.company_name.trim().is_empty() {
        errors.insert(Field::CompanyName, COMPANY_NAME_REQUIRED);
    }

    if candidate.job_role.trim().is_empty() {
        errors.insert(Field::JobRole, JOB_ROLE_REQUIRED);
    }

    if candidate.application_date.is_empty() {
        errors.insert(Field::ApplicationDate, APPLICATION_DATE_REQUIRED);
    }

    if candidate.status.is_none() {
        errors.insert(Field::Status, STATUS_REQUIRED);
    }

    errors
}

/// Reject application dates after `today`.
///
/// This is a UI-boundary check and is not part of [`validate`]. Dates that do
/// not parse are left to the caller.
pub fn ensure_not_in_future(application_date: &str, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let Some(date) = parse_application_date(application_date) {
        if date.date() > today {
            errors.insert(Field::ApplicationDate, APPLICATION_DATE_IN_FUTURE);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ApplicationStatus;

    fn valid_draft() -> JobDraft {
        JobDraft::new("Google", "SWE", "2024-01-10", ApplicationStatus::Applied)
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn blank_company_name_is_the_only_error() {
        let draft = JobDraft {
            company_name: String::new(),
            job_role: "X".to_string(),
            application_date: "2024-01-01".to_string(),
            status: Some(ApplicationStatus::Applied),
        };

        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::CompanyName), Some(COMPANY_NAME_REQUIRED));
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "companyName": "Company name is required" })
        );
    }

    #[test]
    fn whitespace_only_names_are_blank() {
        let draft = JobDraft {
            company_name: "   ".to_string(),
            job_role: "\t\n".to_string(),
            ..valid_draft()
        };
        let errors = validate(&draft);
        assert_eq!(errors.get(Field::CompanyName), Some(COMPANY_NAME_REQUIRED));
        assert_eq!(errors.get(Field::JobRole), Some(JOB_ROLE_REQUIRED));
        assert_eq!(errors.get(Field::ApplicationDate), None);
    }

    #[test]
    fn all_checks_run_on_empty_input() {
        let draft = JobDraft {
            status: None,
            ..JobDraft::default()
        };
        let errors = validate(&draft);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::Status), Some(STATUS_REQUIRED));
        assert_eq!(
            errors.get(Field::ApplicationDate),
            Some(APPLICATION_DATE_REQUIRED)
        );
    }

    #[test]
    fn into_result_lists_every_field() {
        let draft = JobDraft {
            company_name: String::new(),
            job_role: String::new(),
            ..valid_draft()
        };
        let err = validate(&draft).into_result().unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("companyName: Company name is required"));
                assert!(msg.contains("jobRole: Job role is required"));
            }
            _ => panic!("Expected Validation error"),
        }
        assert!(validate(&valid_draft()).into_result().is_ok());
    }

    #[test]
    fn future_dates_are_rejected_at_the_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(ensure_not_in_future("2024-06-01", today).is_empty());
        assert!(ensure_not_in_future("2023-12-31", today).is_empty());
        assert!(ensure_not_in_future("garbage", today).is_empty());

        let errors = ensure_not_in_future("2024-06-02", today);
        assert_eq!(
            errors.get(Field::ApplicationDate),
            Some(APPLICATION_DATE_IN_FUTURE)
        );
    }
}
