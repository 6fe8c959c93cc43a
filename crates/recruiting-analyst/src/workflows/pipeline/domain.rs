use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::level::{infer_level, infer_role_function};
use super::normalizer::normalize_name;
use super::rules::{AiRolloutPolicy, RecruitingRules};

/// Greenhouse job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Greenhouse application identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Closed,
}

impl JobStatus {
    fn from_api(value: Option<&str>) -> Self {
        match value.map(normalize_name).as_deref() {
            Some("closed") => Self::Closed,
            _ => Self::Open,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Engineering seniority inferred from a job title. Best effort: titles the
/// keyword heuristic does not recognize are reported as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "SWE1")]
    Swe1,
    #[serde(rename = "SWE2")]
    Swe2,
    Senior,
    Staff,
    Unknown,
}

impl Level {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Swe1 => "SWE1",
            Self::Swe2 => "SWE2",
            Self::Senior => "Senior",
            Self::Staff => "Staff",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFunction {
    Engineer,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruiter {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Recruiter {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Interview template configured on a job stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schedulable: bool,
}

/// Named step of a job's hiring plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

impl Stage {
    pub fn from_api(raw: &Value) -> Result<Self, MalformedRecordError> {
        let id = optional_id(raw.get("id")).unwrap_or_default();
        let name = required_string(raw, "name")
            .map_err(|problem| MalformedRecordError::new(RecordKind::Stage, &id, "name", problem))?;

        let interviews = raw
            .get("interviews")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let name = item.get("name").and_then(Value::as_str)?;
                        Some(Interview {
                            id: optional_id(item.get("id")).unwrap_or_default(),
                            name: name.to_string(),
                            schedulable: item
                                .get("schedulable")
                                .and_then(Value::as_bool)
                                .unwrap_or(false),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id,
            name,
            interviews,
        })
    }
}

/// A requisition with its hiring plan and derived rollout flags. Fields are read
/// through accessors so the flags always agree with the stages and level they were
/// computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    name: String,
    department: String,
    location: String,
    status: JobStatus,
    recruiter: Option<Recruiter>,
    function: RoleFunction,
    level: Level,
    ai_eligible: bool,
    ai_enabled: bool,
    #[serde(default)]
    stages: Vec<Stage>,
}

impl Job {
    /// Builds a job from a Harvest `/jobs` record plus the stages fetched separately
    /// from `/jobs/{id}/stages`.
    pub fn from_api(
        raw: &Value,
        stages: Vec<Stage>,
        rules: &RecruitingRules,
    ) -> Result<Self, MalformedRecordError> {
        let id = required_id(raw, "id").map_err(|problem| {
            MalformedRecordError::new(RecordKind::Job, UNKNOWN_ID, "id", problem)
        })?;
        let name = required_string(raw, "name")
            .map_err(|problem| MalformedRecordError::new(RecordKind::Job, &id, "name", problem))?;

        let department = first_named(raw.get("departments")).unwrap_or_else(|| UNKNOWN.to_string());
        let location = first_named(raw.get("offices"))
            .or_else(|| {
                raw.get("location")
                    .and_then(|location| location.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN.to_string());
        let status = JobStatus::from_api(raw.get("status").and_then(Value::as_str));
        let recruiter = raw
            .get("hiring_team")
            .and_then(|team| team.get("recruiters"))
            .or_else(|| raw.get("recruiters"))
            .and_then(Value::as_array)
            .and_then(|recruiters| recruiters.iter().find_map(recruiter_from_api));

        let level = custom_field_level(raw, rules)
            .unwrap_or_else(|| infer_level(&name, &rules.levels));
        let function = infer_role_function(&name, &rules.levels);
        let (ai_eligible, ai_enabled) = rollout_flags(function, level, &stages, &rules.rollout);

        Ok(Self {
            id: JobId(id),
            name,
            department,
            location,
            status,
            recruiter,
            function,
            level,
            ai_eligible,
            ai_enabled,
            stages,
        })
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn recruiter(&self) -> Option<&Recruiter> {
        self.recruiter.as_ref()
    }

    pub fn function(&self) -> RoleFunction {
        self.function
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn ai_eligible(&self) -> bool {
        self.ai_eligible
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

fn custom_field_level(raw: &Value, rules: &RecruitingRules) -> Option<Level> {
    let fields = raw.get("custom_fields")?.as_object()?;
    rules
        .levels
        .custom_field_keys
        .iter()
        .filter_map(|key| fields.get(key).and_then(Value::as_str))
        .map(|value| infer_level(value, &rules.levels))
        .find(|level| *level != Level::Unknown)
}

fn rollout_flags(
    function: RoleFunction,
    level: Level,
    stages: &[Stage],
    policy: &AiRolloutPolicy,
) -> (bool, bool) {
    if function != RoleFunction::Engineer {
        return (false, false);
    }

    let take_home_marker = normalize_name(&policy.take_home_stage_marker);
    let screen_marker = normalize_name(&policy.screen_interview_marker);

    let via_take_home = policy.take_home_levels.contains(&level)
        && stages
            .iter()
            .any(|stage| normalize_name(&stage.name).contains(&take_home_marker));
    let via_screen = policy.screen_levels.contains(&level)
        && stages.iter().any(|stage| {
            stage
                .interviews
                .iter()
                .any(|interview| normalize_name(&interview.name).contains(&screen_marker))
        });

    (true, via_take_home || via_screen)
}

fn recruiter_from_api(raw: &Value) -> Option<Recruiter> {
    let first_name = raw.get("first_name").and_then(Value::as_str);
    let last_name = raw.get("last_name").and_then(Value::as_str);
    let (first_name, last_name) = match (first_name, last_name) {
        (None, None) => {
            let name = raw.get("name").and_then(Value::as_str)?;
            match name.split_once(' ') {
                Some((first, last)) => (first, last),
                None => (name, ""),
            }
        }
        (first, last) => (first.unwrap_or_default(), last.unwrap_or_default()),
    };

    Some(Recruiter {
        id: optional_id(raw.get("id")).unwrap_or_default(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    })
}

/// One raw entry of an application's activity feed, as supplied by the source.
/// `occurred_at` stays unparsed; the classifier drops entries it cannot read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub label: String,
    pub occurred_at: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl FeedEntry {
    pub fn new(label: impl Into<String>, occurred_at: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            occurred_at: occurred_at.into(),
            payload: Map::new(),
        }
    }

    pub fn with_payload(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }
}

/// A candidate's application to one job, fetched fresh for every report.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    id: ApplicationId,
    job_id: JobId,
    candidate_id: String,
    candidate_name: String,
    current_stage: String,
    feed: Vec<FeedEntry>,
}

impl Application {
    pub fn new(
        id: ApplicationId,
        job_id: JobId,
        candidate_id: impl Into<String>,
        current_stage: impl Into<String>,
    ) -> Self {
        Self {
            id,
            job_id,
            candidate_id: candidate_id.into(),
            candidate_name: UNKNOWN.to_string(),
            current_stage: current_stage.into(),
            feed: Vec::new(),
        }
    }

    /// Builds the application header from a Harvest `/applications/{id}` record.
    /// The feed and candidate name are attached afterwards.
    pub fn from_api(raw: &Value) -> Result<Self, MalformedRecordError> {
        let id = required_id(raw, "id").map_err(|problem| {
            MalformedRecordError::new(RecordKind::Application, UNKNOWN_ID, "id", problem)
        })?;
        let malformed = |field: &'static str, problem: FieldProblem| {
            MalformedRecordError::new(RecordKind::Application, &id, field, problem)
        };

        let candidate_id =
            required_id(raw, "candidate_id").map_err(|problem| malformed("candidate_id", problem))?;
        let current_stage = raw
            .get("current_stage")
            .ok_or(FieldProblem::Missing)
            .and_then(|stage| required_string(stage, "name"))
            .map_err(|problem| malformed("current_stage.name", problem))?;
        let job_id = raw
            .get("jobs")
            .and_then(Value::as_array)
            .and_then(|jobs| jobs.first())
            .ok_or(FieldProblem::Missing)
            .and_then(|job| required_id(job, "id"))
            .map_err(|problem| malformed("jobs[0].id", problem))?;

        Ok(Self::new(
            ApplicationId(id),
            JobId(job_id),
            candidate_id,
            current_stage,
        ))
    }

    pub fn with_candidate_name(mut self, name: impl Into<String>) -> Self {
        self.candidate_name = name.into();
        self
    }

    pub fn with_feed(mut self, feed: Vec<FeedEntry>) -> Self {
        self.feed = feed;
        self
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    pub fn feed(&self) -> &[FeedEntry] {
        &self.feed
    }
}

const UNKNOWN: &str = "Unknown";
const UNKNOWN_ID: &str = "<unknown>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Job,
    Stage,
    Application,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Job => "job",
            RecordKind::Stage => "stage",
            RecordKind::Application => "application",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldProblem::Missing => "missing",
            FieldProblem::WrongType => "of the wrong type",
        })
    }
}

/// A required identifier or name was absent or mistyped. Fatal to the one
/// record only; report loops skip it and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {record} record `{id}`: field `{field}` is {problem}")]
pub struct MalformedRecordError {
    pub record: RecordKind,
    pub id: String,
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl MalformedRecordError {
    pub fn new(record: RecordKind, id: &str, field: &'static str, problem: FieldProblem) -> Self {
        Self {
            record,
            id: id.to_string(),
            field,
            problem,
        }
    }
}

/// Identifiers arrive as JSON numbers or strings.
fn required_id(raw: &Value, field: &str) -> Result<String, FieldProblem> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(FieldProblem::Missing),
        Some(value) => optional_id(Some(value)).ok_or(FieldProblem::WrongType),
    }
}

pub(crate) fn optional_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    }
}

fn required_string(raw: &Value, field: &str) -> Result<String, FieldProblem> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(FieldProblem::Missing),
        Some(Value::String(text)) if text.trim().is_empty() => Err(FieldProblem::Missing),
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(_) => Err(FieldProblem::WrongType),
    }
}

fn first_named(value: Option<&Value>) -> Option<String> {
    value?
        .as_array()?
        .iter()
        .find_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
}
