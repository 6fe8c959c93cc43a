use serde::Serialize;

use super::pipeline::{Job, JobId, Level};

const NO_RECRUITER: &str = "No Recruiter Assigned";

/// One line of the AI rollout report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiRolloutRow {
    pub job_name: String,
    pub job_id: JobId,
    pub ai_eligible: bool,
    pub ai_enabled: bool,
    pub recruiter_name: String,
    pub location: String,
    pub department: String,
    pub level: Level,
}

pub fn build_ai_rollout_row(job: &Job) -> AiRolloutRow {
    AiRolloutRow {
        job_name: job.name().to_string(),
        job_id: job.id().clone(),
        ai_eligible: job.ai_eligible(),
        ai_enabled: job.ai_enabled(),
        recruiter_name: job
            .recruiter()
            .map(|recruiter| recruiter.full_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| NO_RECRUITER.to_string()),
        location: job.location().to_string(),
        department: job.department().to_string(),
        level: job.level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::pipeline::{RecruitingRules, Stage};
    use serde_json::json;

    fn job(raw: serde_json::Value, stages: Vec<Stage>) -> Job {
        Job::from_api(&raw, stages, &RecruitingRules::default()).expect("job parses")
    }

    #[test]
    fn row_mirrors_job_flags() {
        let take_home = Stage::from_api(&json!({ "id": 1, "name": "Take Home Test" }))
            .expect("stage parses");
        let job = job(
            json!({
                "id": 4012,
                "name": "SWE1, Growth",
                "departments": [{ "name": "Growth" }],
                "offices": [{ "name": "New York" }],
                "hiring_team": { "recruiters": [{ "first_name": "Dana", "last_name": "Reyes" }] }
            }),
            vec![take_home],
        );

        let row = build_ai_rollout_row(&job);

        assert_eq!(row.job_id, JobId("4012".to_string()));
        assert_eq!(row.job_name, "SWE1, Growth");
        assert!(row.ai_eligible);
        assert!(row.ai_enabled);
        assert_eq!(row.level, Level::Swe1);
        assert_eq!(row.recruiter_name, "Dana Reyes");
        assert_eq!(row.location, "New York");
        assert_eq!(row.department, "Growth");
    }

    #[test]
    fn missing_recruiter_is_called_out() {
        let job = job(json!({ "id": 4013, "name": "Product Designer" }), Vec::new());

        let row = build_ai_rollout_row(&job);

        assert_eq!(row.recruiter_name, "No Recruiter Assigned");
        assert!(!row.ai_eligible);
        assert_eq!(row.level, Level::Unknown);
    }
}
