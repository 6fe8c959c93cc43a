use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::ApplicationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    TakeHome,
    Interview,
    Other,
}

impl StageType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TakeHome => "take home",
            Self::Interview => "interview",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Scheduled,
    Complete,
    Unknown,
}

impl StageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Complete => "complete",
            Self::Unknown => "unknown",
        }
    }
}

/// Take-home progress of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TakeHome {
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl TakeHome {
    /// Graded at or after the latest submission. A grade with no recorded
    /// submission still counts.
    pub fn graded_after_submission(&self) -> bool {
        match (self.submitted_at, self.graded_at) {
            (Some(submitted), Some(graded)) => graded >= submitted,
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }

    pub fn awaiting_grading(&self) -> bool {
        self.submitted_at.is_some() && !self.graded_after_submission()
    }
}

/// The most recent timeline field of a row and how long ago it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastEvent {
    pub reference: &'static str,
    pub at: DateTime<Utc>,
    pub hours_elapsed: f64,
}

/// One normalized record per application. Absent timestamps mean the event never
/// occurred; the two counts are derived independently of each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRow {
    pub application_id: ApplicationId,
    pub candidate_id: String,
    pub candidate_name: String,
    pub current_stage: String,
    pub stage_type: StageType,
    pub stage_status: StageStatus,
    pub moved_to_stage_at: Option<DateTime<Utc>>,
    pub availability_requested_at: Option<DateTime<Utc>>,
    pub availability_received_at: Option<DateTime<Utc>>,
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    pub interview_date: Option<DateTime<Utc>>,
    pub take_home_submitted_at: Option<DateTime<Utc>>,
    pub take_home_graded_at: Option<DateTime<Utc>>,
    pub scheduled_interviews_count: u32,
    pub completed_interviews_count: u32,
    pub recruiter_name: String,
    pub location: String,
    pub department: String,
}

impl PipelineRow {
    pub fn take_home(&self) -> TakeHome {
        TakeHome {
            submitted_at: self.take_home_submitted_at,
            graded_at: self.take_home_graded_at,
        }
    }

    /// Rows in `other` stages are left out of the job pipeline report by default.
    pub fn is_relevant(&self) -> bool {
        self.stage_type != StageType::Other
    }

    pub fn hours_pending_grading(&self, as_of: DateTime<Utc>) -> Option<f64> {
        let take_home = self.take_home();
        if !take_home.awaiting_grading() {
            return None;
        }
        take_home
            .submitted_at
            .map(|submitted| hours_between(submitted, as_of))
    }

    pub fn last_event(&self, as_of: DateTime<Utc>) -> Option<LastEvent> {
        [
            ("moved_to_stage_at", self.moved_to_stage_at),
            ("availability_requested_at", self.availability_requested_at),
            ("availability_received_at", self.availability_received_at),
            ("interview_scheduled_at", self.interview_scheduled_at),
            ("take_home_submitted_at", self.take_home_submitted_at),
            ("take_home_graded_at", self.take_home_graded_at),
        ]
        .into_iter()
        .filter_map(|(reference, at)| at.map(|at| (reference, at)))
        .max_by_key(|(_, at)| *at)
        .map(|(reference, at)| LastEvent {
            reference,
            at,
            hours_elapsed: hours_between(at, as_of),
        })
    }
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let hours = (to - from).num_seconds() as f64 / 3600.0;
    (hours * 10.0).round() / 10.0
}
