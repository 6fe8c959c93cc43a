use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::workflows::pipeline::domain::{
    Application, ApplicationId, FeedEntry, Job, JobId, Stage,
};
use crate::workflows::pipeline::rules::RecruitingRules;

pub(super) fn rules() -> RecruitingRules {
    RecruitingRules::default()
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Feed timestamps in the shape Greenhouse returns them.
pub(super) fn stamp(day: u32, hour: u32) -> String {
    at(day, hour).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(super) fn entry(label: &str, day: u32, hour: u32) -> FeedEntry {
    FeedEntry::new(label, stamp(day, hour))
}

pub(super) fn stage(name: &str, interviews: &[&str]) -> Value {
    json!({
        "id": 7001,
        "name": name,
        "interviews": interviews
            .iter()
            .enumerate()
            .map(|(index, name)| json!({ "id": 9000 + index, "name": name, "schedulable": true }))
            .collect::<Vec<_>>(),
    })
}

pub(super) fn raw_job(title: &str) -> Value {
    json!({
        "id": 4012,
        "name": title,
        "status": "open",
        "departments": [{ "id": 11, "name": "Platform" }],
        "offices": [{ "id": 3, "name": "Remote - US" }],
        "hiring_team": {
            "recruiters": [{ "id": 88, "first_name": "Dana", "last_name": "Reyes" }]
        },
        "custom_fields": {}
    })
}

pub(super) fn job_with_stages(title: &str, stages: &[Value]) -> Job {
    let stages = stages
        .iter()
        .map(|raw| Stage::from_api(raw).expect("stage fixture is well formed"))
        .collect();
    Job::from_api(&raw_job(title), stages, &rules()).expect("job fixture is well formed")
}

pub(super) fn engineering_job() -> Job {
    job_with_stages(
        "Software Engineer II",
        &[stage("Take Home Test", &[]), stage("Onsite", &["System Design"])],
    )
}

pub(super) fn application(current_stage: &str, feed: Vec<FeedEntry>) -> Application {
    Application::new(
        ApplicationId("5550101".to_string()),
        JobId("4012".to_string()),
        "3300",
        current_stage,
    )
    .with_candidate_name("Alex Kim")
    .with_feed(feed)
}
