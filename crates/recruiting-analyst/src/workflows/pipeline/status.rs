use chrono::{DateTime, Utc};

use super::views::{StageStatus, TakeHome};

/// Per-field results of the timeline scan, the only input the status decision sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TimelineFields {
    pub(crate) moved_to_stage_at: Option<DateTime<Utc>>,
    pub(crate) availability_requested_at: Option<DateTime<Utc>>,
    pub(crate) availability_received_at: Option<DateTime<Utc>>,
    pub(crate) interview_scheduled_at: Option<DateTime<Utc>>,
    pub(crate) interview_date: Option<DateTime<Utc>>,
    pub(crate) take_home_submitted_at: Option<DateTime<Utc>>,
    pub(crate) take_home_graded_at: Option<DateTime<Utc>>,
    pub(crate) interview_completed_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_interviews: u32,
    pub(crate) completed_interviews: u32,
}

impl TimelineFields {
    fn take_home(&self) -> TakeHome {
        TakeHome {
            submitted_at: self.take_home_submitted_at,
            graded_at: self.take_home_graded_at,
        }
    }

    /// Evidence older than the entry into the current stage belongs to an earlier
    /// stage. Without a recorded entry every timestamp counts.
    fn since_stage_entry(&self, at: Option<DateTime<Utc>>) -> bool {
        match (self.moved_to_stage_at, at) {
            (Some(entered), Some(at)) => at >= entered,
            _ => true,
        }
    }

    fn take_home_graded_in_stage(&self) -> bool {
        self.take_home().graded_after_submission()
            && self.since_stage_entry(self.take_home_graded_at)
    }

    /// Every scheduling action has a matching completion, at least one happened,
    /// and the latest completion falls within the current stage.
    fn interviews_resolved(&self) -> bool {
        self.completed_interviews > 0
            && self.completed_interviews >= self.scheduled_interviews
            && self.since_stage_entry(self.interview_completed_at)
    }

    fn interview_open(&self) -> bool {
        self.scheduled_interviews > self.completed_interviews
    }

    fn availability_outstanding(&self) -> bool {
        match (self.availability_requested_at, self.availability_received_at) {
            (Some(requested), Some(received)) => received < requested,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// An outstanding request made after the stage was entered is an open
    /// scheduling action of the current stage.
    fn availability_open_in_stage(&self) -> bool {
        self.availability_outstanding() && self.since_stage_entry(self.availability_requested_at)
    }

    fn no_action_taken(&self) -> bool {
        self.availability_requested_at.is_none()
            && self.availability_received_at.is_none()
            && self.take_home_submitted_at.is_none()
            && self.take_home_graded_at.is_none()
            && self.scheduled_interviews == 0
            && self.completed_interviews == 0
    }
}

/// Fixed decision order: complete, scheduled, pending, unknown.
pub(crate) fn decide_stage_status(fields: &TimelineFields) -> StageStatus {
    let completed = fields.take_home_graded_in_stage() || fields.interviews_resolved();
    if completed && !fields.availability_open_in_stage() {
        return StageStatus::Complete;
    }

    if fields.interview_open() {
        return StageStatus::Scheduled;
    }

    if fields.availability_outstanding() || fields.no_action_taken() {
        return StageStatus::Pending;
    }

    StageStatus::Unknown
}
