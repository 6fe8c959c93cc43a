use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use recruiting_analyst::error::AppError;
use recruiting_analyst::greenhouse::{RecruitingSource, SourceError};
use recruiting_analyst::jobs::JobIndex;
use recruiting_analyst::workflows::pipeline::{
    Application, ApplicationId, FeedEntry, Job, JobId, RecruitingRules, Stage,
};
use recruiting_analyst_cli::commands::{
    ai_rollout_report, job_pipeline_report, list_jobs, take_home_snapshot_report,
    PipelineOptions, SnapshotOptions,
};
use serde_json::json;

#[derive(Default)]
struct StubSource {
    jobs: Vec<Job>,
    applications: HashMap<JobId, Vec<Application>>,
}

#[async_trait]
impl RecruitingSource for StubSource {
    async fn get_job(&self, job_id: &JobId) -> Result<Job, SourceError> {
        self.jobs
            .iter()
            .find(|job| job.id() == job_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                resource: "job",
                id: job_id.to_string(),
            })
    }

    async fn list_jobs(
        &self,
        _department: Option<&str>,
        _include_closed: bool,
    ) -> Result<Vec<Job>, SourceError> {
        Ok(self.jobs.clone())
    }

    async fn list_application_ids(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationId>, SourceError> {
        Ok(self
            .applications
            .get(job_id)
            .map(|applications| applications.iter().map(|app| app.id().clone()).collect())
            .unwrap_or_default())
    }

    async fn get_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, SourceError> {
        self.applications
            .values()
            .flatten()
            .find(|application| application.id() == application_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                resource: "application",
                id: application_id.to_string(),
            })
    }
}

fn software_engineer_2() -> Job {
    let stages = ["Technical Phone Screen", "Take Home Test", "Onsite"]
        .iter()
        .map(|name| Stage::from_api(&json!({ "id": 1, "name": name })).expect("stage parses"))
        .collect();
    Job::from_api(
        &json!({
            "id": 5179819,
            "name": "Software Engineer 2",
            "status": "open",
            "departments": [{ "id": 4004041, "name": "R&D" }],
            "offices": [{ "id": 4030182, "name": "Remote - Canada" }],
            "hiring_team": { "recruiters": [{ "id": 9, "first_name": "Dana", "last_name": "Reyes" }] }
        }),
        stages,
        &RecruitingRules::default(),
    )
    .expect("job parses")
}

fn fixture() -> (StubSource, JobIndex) {
    let job = software_engineer_2();
    let applications = vec![
        Application::new(
            ApplicationId("156728361".to_string()),
            job.id().clone(),
            "138678330",
            "Technical Phone Screen",
        )
        .with_candidate_name("John Doe")
        .with_feed(vec![
            FeedEntry::new(
                "John Doe was moved into Technical Phone Screen for Software Engineer 2",
                "2025-08-19T11:09:00.231Z",
            ),
            FeedEntry::new(
                "Jane Smith manually updated John Doe's availability from Not requested to Requested for Technical Phone Screen",
                "2025-08-20T10:00:00.000Z",
            ),
        ]),
        Application::new(
            ApplicationId("156728362".to_string()),
            job.id().clone(),
            "138678331",
            "Application Review",
        ),
        Application::new(
            ApplicationId("156728363".to_string()),
            job.id().clone(),
            "138678332",
            "Take Home Test",
        )
        .with_candidate_name("Ada Park")
        .with_feed(vec![FeedEntry::new(
            "Take home test submitted",
            "2025-08-20T08:00:00Z",
        )]),
    ];

    let mut source = StubSource::default();
    source.applications.insert(job.id().clone(), applications);
    source.jobs.push(job.clone());
    (source, JobIndex::from_jobs([job]))
}

fn render(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("utf-8 output")
}

#[tokio::test]
async fn job_pipeline_skips_other_stages_by_default() {
    let (source, index) = fixture();
    let source: Arc<dyn RecruitingSource> = Arc::new(source);
    let rules = Arc::new(RecruitingRules::default());
    let job_id = JobId("5179819".to_string());

    let mut default_out = Vec::new();
    job_pipeline_report(
        Arc::clone(&source),
        Arc::clone(&rules),
        &index,
        &job_id,
        PipelineOptions {
            include_other: false,
            concurrency: 4,
        },
        &mut default_out,
    )
    .await
    .expect("report runs");
    let default_out = render(default_out);
    let lines: Vec<&str> = default_out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("application_id,current_stage,stage_type,stage_status"));
    assert_eq!(
        lines[1],
        "156728361,Technical Phone Screen,interview,pending,2025-08-19 11:09:00,\
         2025-08-20 10:00:00,,,,,,0,0,Dana Reyes,Remote - Canada,R&D"
    );
    assert!(lines[2].starts_with("156728363,Take Home Test,take home,unknown,"));

    let mut everything = Vec::new();
    job_pipeline_report(
        source,
        rules,
        &index,
        &job_id,
        PipelineOptions {
            include_other: true,
            concurrency: 1,
        },
        &mut everything,
    )
    .await
    .expect("report runs");
    assert!(render(everything)
        .lines()
        .any(|line| line.starts_with("156728362,Application Review,other,pending,")));
}

#[tokio::test]
async fn job_pipeline_requires_a_cached_job() {
    let (source, index) = fixture();

    let error = job_pipeline_report(
        Arc::new(source),
        Arc::new(RecruitingRules::default()),
        &index,
        &JobId("404".to_string()),
        PipelineOptions {
            include_other: false,
            concurrency: 2,
        },
        Vec::new(),
    )
    .await
    .expect_err("job is not cached");

    assert!(matches!(error, AppError::JobNotCached(JobId(ref id)) if id == "404"));
}

#[tokio::test]
async fn snapshot_lists_waiting_take_homes() {
    let (source, index) = fixture();
    let as_of = Utc
        .with_ymd_and_hms(2025, 8, 21, 20, 0, 0)
        .single()
        .expect("valid timestamp");

    let mut out = Vec::new();
    take_home_snapshot_report(
        Arc::new(source),
        Arc::new(RecruitingRules::default()),
        &index,
        SnapshotOptions {
            concurrency: 2,
            domain: "app.greenhouse.io".to_string(),
            as_of,
        },
        &mut out,
    )
    .await
    .expect("snapshot runs");
    let out = render(out);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "Ada Park,https://app.greenhouse.io/people/138678332/applications/156728363,\
         Take Home Test,unknown,,2025-08-20 08:00:00,,36.0,take_home_submitted_at,36.0,\
         Dana Reyes,Remote - Canada,R&D"
    );
}

#[test]
fn ai_rollout_report_reads_the_cache_index() {
    let (_, index) = fixture();

    let mut out = Vec::new();
    ai_rollout_report(&index, &mut out).expect("report runs");

    assert_eq!(
        render(out),
        "job_name,job_id,ai_eligible,ai_enabled,recruiter_name,location,department,level\n\
         Software Engineer 2,5179819,true,true,Dana Reyes,Remote - Canada,R&D,SWE2\n"
    );
}

#[tokio::test]
async fn list_jobs_truncates_to_limit() {
    let (source, _) = fixture();

    let mut out = Vec::new();
    list_jobs(&source, None, false, 0, &mut out)
        .await
        .expect("listing runs");
    let out = render(out);

    assert!(out.starts_with("Found 1 job(s):"));
    assert!(out.contains("... and 1 more job(s)"));
    assert!(!out.contains("Software Engineer 2"));
}
