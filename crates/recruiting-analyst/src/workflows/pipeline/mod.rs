//! Pipeline event reconstruction.
//!
//! A Greenhouse activity feed is a loosely typed log. [`classify_entry`] maps each
//! entry onto the closed [`EventKind`] set, and [`TimelineReducer`] sorts the
//! classified events and folds them into one [`PipelineRow`] per application.
//! Keyword tables live in [`RecruitingRules`] and are passed in explicitly.

mod classifier;
pub mod domain;
mod level;
pub(crate) mod normalizer;
mod reducer;
pub mod rules;
mod status;
pub(crate) mod timestamps;
pub mod views;

#[cfg(test)]
mod tests;

pub use classifier::{
    classify_entry, classify_stage_type, ActivityEvent, EventKind, INTERVIEW_COMPLETED,
    INTERVIEW_RECORD_KEY, INTERVIEW_SCHEDULED,
};
pub use domain::{
    Application, ApplicationId, FeedEntry, FieldProblem, Interview, Job, JobId, JobStatus, Level,
    MalformedRecordError, Recruiter, RecordKind, RoleFunction, Stage,
};
pub use reducer::{build_pipeline_row, TimelineReducer};
pub use rules::{
    AiRolloutPolicy, EventPatterns, LevelKeywords, PatternFamily, RecruitingRules,
    StageTypeKeywords,
};
pub use views::{LastEvent, PipelineRow, StageStatus, StageType, TakeHome};
