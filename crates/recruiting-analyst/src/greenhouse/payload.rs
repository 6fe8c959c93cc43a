use serde_json::Value;

use crate::workflows::pipeline::domain::optional_id;
use crate::workflows::pipeline::normalizer::normalize_name;
use crate::workflows::pipeline::{
    classify_stage_type, FeedEntry, StageType, StageTypeKeywords, INTERVIEW_COMPLETED,
    INTERVIEW_RECORD_KEY, INTERVIEW_SCHEDULED,
};

pub(crate) const TAKE_HOME_GRADED_LABEL: &str = "Take home test graded";

/// `first_name last_name` of a `/candidates/{id}` record.
pub(crate) fn candidate_name(candidate: &Value) -> Option<String> {
    let first = candidate.get("first_name").and_then(Value::as_str).unwrap_or("");
    let last = candidate.get("last_name").and_then(Value::as_str).unwrap_or("");
    let name = format!("{first} {last}").trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// Flattens the Harvest payloads of one application into feed entries the
/// classifier understands. Entries keep whatever timestamp string Harvest sent.
pub(crate) fn synthesize_feed(
    activity_feed: &Value,
    scheduled_interviews: &[Value],
    scorecards: &[Value],
    stage_types: &StageTypeKeywords,
) -> Vec<FeedEntry> {
    let mut feed = activity_entries(activity_feed);

    for interview in scheduled_interviews {
        feed.extend(interview_entries(interview));
    }

    let take_home_scorecards = take_home_scorecard_ids(scheduled_interviews, stage_types);
    feed.extend(
        scorecards
            .iter()
            .filter(|scorecard| is_take_home_scorecard(scorecard, &take_home_scorecards, stage_types))
            .filter_map(|scorecard| {
                let submitted_at = scorecard.get("submitted_at").and_then(Value::as_str)?;
                Some(FeedEntry::new(TAKE_HOME_GRADED_LABEL, submitted_at))
            }),
    );

    feed
}

fn activity_entries(activity_feed: &Value) -> Vec<FeedEntry> {
    activity_feed
        .get("activities")
        .and_then(Value::as_array)
        .map(|activities| {
            activities
                .iter()
                .filter_map(|activity| {
                    let label = non_empty_str(activity.get("body"))
                        .or_else(|| non_empty_str(activity.get("subject")))?;
                    let created_at = activity.get("created_at").and_then(Value::as_str)?;
                    Some(FeedEntry::new(label, created_at))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn interview_entries(interview: &Value) -> Vec<FeedEntry> {
    let name = interview_name(interview).unwrap_or("Interview");
    let mut entries = Vec::new();

    if let Some(created_at) = interview.get("created_at").and_then(Value::as_str) {
        let mut scheduled = FeedEntry::new(format!("Interview scheduled: {name}"), created_at)
            .with_payload(INTERVIEW_RECORD_KEY, Value::from(INTERVIEW_SCHEDULED));
        if let Some(start) = interview.get("start").filter(|start| !start.is_null()) {
            scheduled = scheduled.with_payload("start", start.clone());
        }
        entries.push(scheduled);
    }

    let complete = interview
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| normalize_name(status) == "complete");
    if complete {
        let finished_at = interview
            .get("end")
            .and_then(|end| end.get("date_time"))
            .and_then(Value::as_str)
            .or_else(|| interview.get("updated_at").and_then(Value::as_str));
        if let Some(finished_at) = finished_at {
            entries.push(
                FeedEntry::new(format!("Interview completed: {name}"), finished_at)
                    .with_payload(INTERVIEW_RECORD_KEY, Value::from(INTERVIEW_COMPLETED)),
            );
        }
    }

    entries
}

fn interview_name(interview: &Value) -> Option<&str> {
    interview
        .get("interview")
        .and_then(|inner| inner.get("name"))
        .and_then(Value::as_str)
}

/// Scorecard ids the interviewers of take-home interviews were assigned.
fn take_home_scorecard_ids(
    scheduled_interviews: &[Value],
    stage_types: &StageTypeKeywords,
) -> Vec<String> {
    scheduled_interviews
        .iter()
        .filter(|interview| {
            interview_name(interview)
                .is_some_and(|name| classify_stage_type(name, stage_types) == StageType::TakeHome)
        })
        .filter_map(|interview| interview.get("interviewers").and_then(Value::as_array))
        .flatten()
        .filter_map(|interviewer| optional_id(interviewer.get("scorecard_id")))
        .collect()
}

fn is_take_home_scorecard(
    scorecard: &Value,
    take_home_ids: &[String],
    stage_types: &StageTypeKeywords,
) -> bool {
    if optional_id(scorecard.get("id")).is_some_and(|id| take_home_ids.contains(&id)) {
        return true;
    }

    // Harvest also names the interview on the scorecard itself.
    let named = scorecard
        .get("interview")
        .and_then(Value::as_str)
        .or_else(|| {
            scorecard
                .get("interview_step")
                .and_then(|step| step.get("name"))
                .and_then(Value::as_str)
        });
    named.is_some_and(|name| classify_stage_type(name, stage_types) == StageType::TakeHome)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
