//! Command handlers. Each writes its output to the given writer so they can be
//! driven against in-memory sources.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recruiting_analyst::error::AppError;
use recruiting_analyst::greenhouse::RecruitingSource;
use recruiting_analyst::jobs::JobIndex;
use recruiting_analyst::report::{
    ai_rollout, write_ai_rollout_csv, write_pipeline_csv, write_take_home_snapshot_csv,
    PipelineReporter,
};
use recruiting_analyst::workflows::pipeline::{JobId, PipelineRow, RecruitingRules};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub include_other: bool,
    pub concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub concurrency: usize,
    /// Host used in candidate links.
    pub domain: String,
    pub as_of: DateTime<Utc>,
}

pub fn print_json<W: Write>(mut out: W, value: &Value) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    writeln!(out, "{rendered}")?;
    Ok(())
}

pub async fn list_jobs<W: Write>(
    source: &dyn RecruitingSource,
    department: Option<&str>,
    include_closed: bool,
    limit: usize,
    mut out: W,
) -> Result<(), AppError> {
    let jobs = source.list_jobs(department, include_closed).await?;
    if jobs.is_empty() {
        writeln!(out, "No jobs found matching the criteria.")?;
        return Ok(());
    }

    writeln!(out, "Found {} job(s):", jobs.len())?;
    writeln!(out, "{}", "=".repeat(80))?;
    for (position, job) in jobs.iter().take(limit).enumerate() {
        writeln!(out, "{}. {}", position + 1, job.name())?;
        writeln!(out, "   ID: {}", job.id())?;
        writeln!(out, "   Status: {}", job.status().label())?;
        writeln!(out, "   Location: {}", job.location())?;
        writeln!(out, "   Department: {}", job.department())?;
        writeln!(out, "   Level: {}", job.level().label())?;
        if let Some(recruiter) = job.recruiter() {
            writeln!(out, "   Recruiter: {}", recruiter.full_name())?;
        }
        writeln!(
            out,
            "   AI: eligible={} enabled={}",
            job.ai_eligible(),
            job.ai_enabled()
        )?;
        writeln!(out)?;
    }
    if jobs.len() > limit {
        writeln!(out, "... and {} more job(s)", jobs.len() - limit)?;
    }
    Ok(())
}

pub fn ai_rollout_report<W: Write>(index: &JobIndex, out: W) -> Result<(), AppError> {
    let rows = ai_rollout(index);
    info!(jobs = rows.len(), "writing ai rollout report");
    write_ai_rollout_csv(out, &rows)?;
    Ok(())
}

/// Looks the job up in the cache, then fetches its applications fresh.
pub async fn job_pipeline_report<W: Write>(
    source: Arc<dyn RecruitingSource>,
    rules: Arc<RecruitingRules>,
    index: &JobIndex,
    job_id: &JobId,
    options: PipelineOptions,
    out: W,
) -> Result<(), AppError> {
    let job = index
        .get(job_id)
        .ok_or_else(|| AppError::JobNotCached(job_id.clone()))?;

    let reporter = PipelineReporter::new(source, rules, options.concurrency);
    let rows: Vec<PipelineRow> = reporter
        .job_pipeline(job)
        .await?
        .into_iter()
        .filter(|row| options.include_other || row.is_relevant())
        .collect();

    info!(job_id = %job_id, rows = rows.len(), "writing job pipeline report");
    write_pipeline_csv(out, &rows)?;
    Ok(())
}

pub async fn take_home_snapshot_report<W: Write>(
    source: Arc<dyn RecruitingSource>,
    rules: Arc<RecruitingRules>,
    index: &JobIndex,
    options: SnapshotOptions,
    out: W,
) -> Result<(), AppError> {
    let reporter = PipelineReporter::new(source, rules, options.concurrency);
    let rows = reporter.take_home_snapshot(index.jobs()).await?;

    info!(rows = rows.len(), "writing take-home snapshot");
    write_take_home_snapshot_csv(out, &rows, &options.domain, options.as_of)?;
    Ok(())
}
