use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::domain::FeedEntry;
use super::normalizer::{normalize_name, NormalizedText};
use super::rules::{EventPatterns, StageTypeKeywords};
use super::timestamps::{parse_timestamp, timestamp_from_value};
use super::views::StageType;

/// Payload key marking entries built from scheduled-interview records. Its value
/// is [`INTERVIEW_SCHEDULED`] or [`INTERVIEW_COMPLETED`]; such entries count as
/// interviews whatever the interview is called.
pub const INTERVIEW_RECORD_KEY: &str = "interview_record";
pub const INTERVIEW_SCHEDULED: &str = "scheduled";
pub const INTERVIEW_COMPLETED: &str = "completed";

/// Closed set of event kinds a feed entry can be classified into.
///
/// Variant order is the classification priority and also the tie-break when two
/// events share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    StageChange { stage: String },
    AvailabilityRequested,
    AvailabilityReceived,
    InterviewScheduled { interview_date: Option<DateTime<Utc>> },
    InterviewCompleted,
    TakeHomeSubmitted,
    TakeHomeGraded,
}

/// A classified feed entry. Ordering is chronological, then by kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActivityEvent {
    pub at: DateTime<Utc>,
    pub kind: EventKind,
}

impl ActivityEvent {
    pub fn stage_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::StageChange { stage } => Some(stage),
            _ => None,
        }
    }
}

/// Classifies one feed entry. `None` means the entry is irrelevant (notes, emails,
/// unrecognized labels) or its timestamp could not be read; neither is an error.
pub fn classify_entry(entry: &FeedEntry, patterns: &EventPatterns) -> Option<ActivityEvent> {
    let at = parse_timestamp(&entry.occurred_at)?;
    let label = NormalizedText::new(&entry.label);
    let kind = classify_label(&label, &entry.payload, patterns)?;
    Some(ActivityEvent { at, kind })
}

fn classify_label(
    label: &NormalizedText,
    payload: &Map<String, Value>,
    patterns: &EventPatterns,
) -> Option<EventKind> {
    match payload.get(INTERVIEW_RECORD_KEY).and_then(Value::as_str) {
        Some(INTERVIEW_SCHEDULED) => {
            return Some(EventKind::InterviewScheduled {
                interview_date: interview_date(payload),
            })
        }
        Some(INTERVIEW_COMPLETED) => return Some(EventKind::InterviewCompleted),
        _ => {}
    }

    let folded = label.folded.as_str();

    if let Some(end) = patterns.stage_change.match_end(folded) {
        // A stage change without a recoverable stage name carries nothing to fold.
        return stage_name(label, end, payload).map(|stage| EventKind::StageChange { stage });
    }
    if patterns.availability_requested.match_end(folded).is_some() {
        return Some(EventKind::AvailabilityRequested);
    }
    if patterns.availability_received.match_end(folded).is_some() {
        return Some(EventKind::AvailabilityReceived);
    }
    if patterns.interview_scheduled.match_end(folded).is_some() {
        return Some(EventKind::InterviewScheduled {
            interview_date: interview_date(payload),
        });
    }
    if patterns.interview_completed.match_end(folded).is_some() {
        return Some(EventKind::InterviewCompleted);
    }
    if patterns.take_home_submitted.match_end(folded).is_some() {
        return Some(EventKind::TakeHomeSubmitted);
    }
    if patterns.take_home_graded.match_end(folded).is_some() {
        return Some(EventKind::TakeHomeGraded);
    }
    None
}

fn stage_name(label: &NormalizedText, marker_end: usize, payload: &Map<String, Value>) -> Option<String> {
    if let Some(stage) = payload
        .get("stage_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|stage| !stage.is_empty())
    {
        return Some(stage.to_string());
    }

    let rest_folded = &label.folded[marker_end..];
    let rest_display = &label.display[marker_end..];
    // The job title follows the last " for "; stage names may contain one themselves.
    let cut = rest_folded.rfind(" for ").unwrap_or(rest_folded.len());
    let stage = rest_display[..cut]
        .trim()
        .trim_end_matches(['.', ',', ';', ':', '!'])
        .trim();

    (!stage.is_empty()).then(|| stage.to_string())
}

fn interview_date(payload: &Map<String, Value>) -> Option<DateTime<Utc>> {
    ["interview_date", "start", "scheduled_for"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find_map(timestamp_from_value)
}

/// Total mapping from a stage name to its stage type.
pub fn classify_stage_type(stage_name: &str, keywords: &StageTypeKeywords) -> StageType {
    let folded = normalize_name(stage_name);
    let hits = |candidates: &[String]| {
        candidates
            .iter()
            .map(|keyword| normalize_name(keyword))
            .any(|keyword| !keyword.is_empty() && folded.contains(&keyword))
    };

    if hits(&keywords.take_home) {
        StageType::TakeHome
    } else if hits(&keywords.interview) {
        StageType::Interview
    } else {
        StageType::Other
    }
}
