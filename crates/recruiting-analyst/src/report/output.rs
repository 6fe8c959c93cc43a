use std::io::Write;

use chrono::{DateTime, Utc};

use crate::workflows::pipeline::PipelineRow;
use crate::workflows::rollout::AiRolloutRow;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const PIPELINE_HEADERS: [&str; 16] = [
    "application_id",
    "current_stage",
    "stage_type",
    "stage_status",
    "moved_to_stage_at",
    "availability_requested_at",
    "availability_received_at",
    "interview_scheduled_at",
    "interview_date",
    "take_home_submitted_at",
    "take_home_graded_at",
    "scheduled_interviews_count",
    "completed_interviews_count",
    "recruiter_name",
    "location",
    "department",
];

pub const AI_ROLLOUT_HEADERS: [&str; 8] = [
    "job_name",
    "job_id",
    "ai_eligible",
    "ai_enabled",
    "recruiter_name",
    "location",
    "department",
    "level",
];

pub const TAKE_HOME_SNAPSHOT_HEADERS: [&str; 13] = [
    "candidate_name",
    "greenhouse_link",
    "current_stage",
    "stage_status",
    "moved_to_stage_at",
    "take_home_submitted_at",
    "take_home_graded_at",
    "hours_pending_grading",
    "last_event_time_reference",
    "blocked_hours",
    "recruiter_name",
    "location",
    "department",
];

pub fn write_pipeline_csv<W: Write>(writer: W, rows: &[PipelineRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(PIPELINE_HEADERS)?;

    for row in rows {
        csv_writer.write_record([
            row.application_id.to_string(),
            row.current_stage.clone(),
            row.stage_type.label().to_string(),
            row.stage_status.label().to_string(),
            timestamp(row.moved_to_stage_at),
            timestamp(row.availability_requested_at),
            timestamp(row.availability_received_at),
            timestamp(row.interview_scheduled_at),
            timestamp(row.interview_date),
            timestamp(row.take_home_submitted_at),
            timestamp(row.take_home_graded_at),
            row.scheduled_interviews_count.to_string(),
            row.completed_interviews_count.to_string(),
            row.recruiter_name.clone(),
            row.location.clone(),
            row.department.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_ai_rollout_csv<W: Write>(writer: W, rows: &[AiRolloutRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(AI_ROLLOUT_HEADERS)?;

    for row in rows {
        csv_writer.write_record([
            row.job_name.clone(),
            row.job_id.to_string(),
            row.ai_eligible.to_string(),
            row.ai_enabled.to_string(),
            row.recruiter_name.clone(),
            row.location.clone(),
            row.department.clone(),
            row.level.label().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Elapsed-time columns are measured against `as_of`.
pub fn write_take_home_snapshot_csv<W: Write>(
    writer: W,
    rows: &[PipelineRow],
    domain: &str,
    as_of: DateTime<Utc>,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TAKE_HOME_SNAPSHOT_HEADERS)?;

    for row in rows {
        let last_event = row.last_event(as_of);
        csv_writer.write_record([
            row.candidate_name.clone(),
            greenhouse_link(domain, row),
            row.current_stage.clone(),
            row.stage_status.label().to_string(),
            timestamp(row.moved_to_stage_at),
            timestamp(row.take_home_submitted_at),
            timestamp(row.take_home_graded_at),
            hours(row.hours_pending_grading(as_of)),
            last_event
                .as_ref()
                .map(|event| event.reference.to_string())
                .unwrap_or_default(),
            hours(last_event.as_ref().map(|event| event.hours_elapsed)),
            row.recruiter_name.clone(),
            row.location.clone(),
            row.department.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn greenhouse_link(domain: &str, row: &PipelineRow) -> String {
    format!(
        "https://{}/people/{}/applications/{}",
        domain.trim_end_matches('/'),
        row.candidate_id,
        row.application_id
    )
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

fn hours(value: Option<f64>) -> String {
    value.map(|hours| format!("{hours:.1}")).unwrap_or_default()
}
