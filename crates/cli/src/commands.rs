//! Command handlers.
//!
//! Handlers write to any `io::Write` so they can be exercised against an
//! in-memory store and buffer.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use jobtracker_applications::{
    ExportError, JobDraft, JobPatch, JobQuery, JobRecord, ValidationErrors, ensure_not_in_future,
    export_file_name, paginate, recent, to_csv, validate,
};
use jobtracker_core::{DomainError, Entity, JobId};
use jobtracker_infra::{DurableSlot, JobStore, PersistenceStatus};

use crate::Command;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Execute one command against `store`.
pub fn run<S, W>(
    command: Command,
    store: &mut JobStore<S>,
    out: &mut W,
    today: NaiveDate,
) -> anyhow::Result<()>
where
    S: DurableSlot,
    W: Write,
{
    match command {
        Command::Add {
            company,
            role,
            date,
            status,
        } => {
            let draft = JobDraft::new(company, role, date.format(DATE_FORMAT).to_string(), status);
            let mut errors = validate(&draft);
            errors.extend(ensure_not_in_future(&draft.application_date, today));
            ensure_valid(errors)?;

            let created = store.create(draft);
            writeln!(out, "Job added successfully! id={}", created.id())?;
            warn_if_degraded(store, out)?;
        }
        Command::Edit {
            id,
            company,
            role,
            date,
            status,
        } => {
            let existing = find(store, &id)?;
            let patch = JobPatch {
                company_name: company,
                job_role: role,
                application_date: date.map(|d| d.format(DATE_FORMAT).to_string()),
                status,
            };
            if patch.is_empty() {
                writeln!(out, "Nothing to update for {id}")?;
                return Ok(());
            }

            let merged = patch.apply_to_draft(&existing.to_draft());
            let mut errors = validate(&merged);
            if let Some(date) = &patch.application_date {
                errors.extend(ensure_not_in_future(date, today));
            }
            ensure_valid(errors)?;

            if store.update(&id, patch).is_some() {
                writeln!(out, "Job updated successfully!")?;
            }
            warn_if_degraded(store, out)?;
        }
        Command::Delete { id } => {
            match store.delete(&id) {
                Some(_) => writeln!(out, "Job deleted successfully!")?,
                None => writeln!(out, "No job with id {id}")?,
            }
            warn_if_degraded(store, out)?;
        }
        Command::Show { id } => {
            let job = find(store, &id)?;
            writeln!(out, "id:               {}", job.id())?;
            writeln!(out, "company:          {}", job.company_name())?;
            writeln!(out, "role:             {}", job.job_role())?;
            writeln!(out, "application date: {}", job.application_date())?;
            writeln!(out, "status:           {}", job.status_label())?;
            writeln!(out, "created at:       {}", job.created_at().to_rfc3339())?;
        }
        Command::List {
            status,
            search,
            order,
            page,
            per_page,
        } => {
            let query = JobQuery {
                status,
                search,
                order,
            };
            let listed = query.apply(store.list());
            let page = paginate(&listed, page, per_page);

            let noun = if page.total_items == 1 {
                "application"
            } else {
                "applications"
            };
            writeln!(out, "{} {noun} found", page.total_items)?;
            for job in &page.items {
                write_row(out, job)?;
            }
            if page.total_pages > 1 {
                writeln!(out, "page {} of {}", page.page, page.total_pages)?;
            }
        }
        Command::Stats => {
            let stats = store.stats();
            writeln!(out, "total:     {}", stats.total)?;
            writeln!(out, "applied:   {}", stats.applied)?;
            writeln!(out, "interview: {}", stats.interview)?;
            writeln!(out, "selected:  {}", stats.selected)?;
            writeln!(out, "rejected:  {}", stats.rejected)?;
        }
        Command::Recent { limit } => {
            for job in recent(store.list(), limit) {
                write_row(out, &job)?;
            }
        }
        Command::Export { out: dir } => export(store.list(), &dir, out, today)?,
    }

    Ok(())
}

fn export<W: Write>(jobs: &[JobRecord], dir: &Path, out: &mut W, today: NaiveDate) -> anyhow::Result<()> {
    let csv = match to_csv(jobs) {
        Ok(csv) => csv,
        Err(ExportError::NoData) => {
            writeln!(out, "No jobs to export!")?;
            return Ok(());
        }
    };

    let path = dir.join(export_file_name(today));
    fs::write(&path, csv).with_context(|| format!("failed to write export to {}", path.display()))?;
    tracing::info!(path = %path.display(), count = jobs.len(), "exported job applications");
    writeln!(out, "Exported {} applications to {}", jobs.len(), path.display())?;
    Ok(())
}

fn find<'a, S: DurableSlot>(store: &'a JobStore<S>, id: &JobId) -> anyhow::Result<&'a JobRecord> {
    store
        .get_by_id(id)
        .ok_or_else(|| DomainError::not_found(format!("job {id}")))
        .context("Job not found!")
}

fn ensure_valid(errors: ValidationErrors) -> anyhow::Result<()> {
    errors
        .into_result()
        .context("please fix the errors in the form")
}

fn write_row<W: Write>(out: &mut W, job: &JobRecord) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        job.id(),
        job.company_name(),
        job.job_role(),
        job.application_date(),
        job.status_label()
    )
}

fn warn_if_degraded<S: DurableSlot, W: Write>(store: &JobStore<S>, out: &mut W) -> anyhow::Result<()> {
    if let PersistenceStatus::Degraded { reason } = store.persistence_status() {
        writeln!(out, "warning: changes are kept for this session only ({reason})")?;
    }
    Ok(())
}
