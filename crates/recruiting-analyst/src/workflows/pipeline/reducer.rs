use super::classifier::{classify_entry, classify_stage_type, ActivityEvent, EventKind};
use super::domain::{Application, Job};
use super::normalizer::normalize_name;
use super::rules::RecruitingRules;
use super::status::{decide_stage_status, TimelineFields};
use super::views::PipelineRow;

const UNKNOWN_RECRUITER: &str = "Unknown";

/// Folds an application's activity feed into its pipeline row.
pub struct TimelineReducer<'a> {
    rules: &'a RecruitingRules,
}

impl<'a> TimelineReducer<'a> {
    pub fn new(rules: &'a RecruitingRules) -> Self {
        Self { rules }
    }

    /// Classifies and re-sorts the feed (input order is never trusted), then scans
    /// it once. Later events overwrite earlier ones field by field.
    pub fn reduce(&self, application: &Application, job: &Job) -> PipelineRow {
        let mut events: Vec<ActivityEvent> = application
            .feed()
            .iter()
            .filter_map(|entry| classify_entry(entry, &self.rules.events))
            .collect();
        events.sort();

        let current_stage = normalize_name(application.current_stage());
        let mut fields = TimelineFields::default();
        for event in &events {
            apply_event(&mut fields, event, &current_stage);
        }

        PipelineRow {
            application_id: application.id().clone(),
            candidate_id: application.candidate_id().to_string(),
            candidate_name: application.candidate_name().to_string(),
            current_stage: application.current_stage().to_string(),
            stage_type: classify_stage_type(application.current_stage(), &self.rules.stage_types),
            stage_status: decide_stage_status(&fields),
            moved_to_stage_at: fields.moved_to_stage_at,
            availability_requested_at: fields.availability_requested_at,
            availability_received_at: fields.availability_received_at,
            interview_scheduled_at: fields.interview_scheduled_at,
            interview_date: fields.interview_date,
            take_home_submitted_at: fields.take_home_submitted_at,
            take_home_graded_at: fields.take_home_graded_at,
            scheduled_interviews_count: fields.scheduled_interviews,
            completed_interviews_count: fields.completed_interviews,
            recruiter_name: job
                .recruiter()
                .map(|recruiter| recruiter.full_name())
                .unwrap_or_else(|| UNKNOWN_RECRUITER.to_string()),
            location: job.location().to_string(),
            department: job.department().to_string(),
        }
    }
}

fn apply_event(fields: &mut TimelineFields, event: &ActivityEvent, current_stage: &str) {
    let at = Some(event.at);
    match &event.kind {
        EventKind::StageChange { stage } => {
            if normalize_name(stage) == current_stage {
                fields.moved_to_stage_at = at;
            }
        }
        EventKind::AvailabilityRequested => fields.availability_requested_at = at,
        EventKind::AvailabilityReceived => fields.availability_received_at = at,
        EventKind::InterviewScheduled { interview_date } => {
            fields.interview_scheduled_at = at;
            fields.interview_date = *interview_date;
            fields.scheduled_interviews += 1;
        }
        EventKind::InterviewCompleted => {
            fields.interview_completed_at = at;
            fields.completed_interviews += 1;
        }
        EventKind::TakeHomeSubmitted => fields.take_home_submitted_at = at,
        EventKind::TakeHomeGraded => fields.take_home_graded_at = at,
    }
}

/// Builds the pipeline row for one application of `job`.
pub fn build_pipeline_row(
    application: &Application,
    job: &Job,
    rules: &RecruitingRules,
) -> PipelineRow {
    TimelineReducer::new(rules).reduce(application, job)
}
