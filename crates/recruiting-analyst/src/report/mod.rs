//! Report generation: fetch applications, reduce them to rows, write CSV.

mod output;

use std::sync::Arc;

use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use crate::greenhouse::{RecruitingSource, SourceError};
use crate::jobs::JobIndex;
use crate::workflows::pipeline::{
    build_pipeline_row, classify_stage_type, ApplicationId, Job, PipelineRow, RecruitingRules,
    StageType,
};
use crate::workflows::rollout::{build_ai_rollout_row, AiRolloutRow};

pub use output::{
    greenhouse_link, write_ai_rollout_csv, write_pipeline_csv, write_take_home_snapshot_csv,
    AI_ROLLOUT_HEADERS, PIPELINE_HEADERS, TAKE_HOME_SNAPSHOT_HEADERS,
};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("application fetch task failed: {0}")]
    Task(#[from] JoinError),
    #[error("fetch limiter closed: {0}")]
    LimiterClosed(#[from] AcquireError),
}

/// Builds pipeline rows for whole jobs, fetching applications concurrently.
pub struct PipelineReporter {
    source: Arc<dyn RecruitingSource>,
    rules: Arc<RecruitingRules>,
    limiter: Arc<Semaphore>,
}

impl PipelineReporter {
    pub fn new(
        source: Arc<dyn RecruitingSource>,
        rules: Arc<RecruitingRules>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            rules,
            limiter: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// One row per active application of `job`, in listing order. Applications
    /// with malformed records are logged and left out.
    pub async fn job_pipeline(&self, job: &Job) -> Result<Vec<PipelineRow>, ReportError> {
        let application_ids = self.source.list_application_ids(job.id()).await?;
        info!(job_id = %job.id(), applications = application_ids.len(), "building job pipeline");

        let job = Arc::new(job.clone());
        let mut join_set = JoinSet::new();
        for (idx, application_id) in application_ids.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let rules = Arc::clone(&self.rules);
            let limiter = Arc::clone(&self.limiter);
            let job = Arc::clone(&job);
            join_set.spawn(async move {
                let _permit = limiter.acquire_owned().await?;
                let row = fetch_row(source.as_ref(), &application_id, &job, &rules).await?;
                Ok::<(usize, Option<PipelineRow>), ReportError>((idx, row))
            });
        }

        let mut slots: Vec<Option<PipelineRow>> = vec![None; application_ids.len()];
        while let Some(joined) = join_set.join_next().await {
            let (idx, row) = joined??;
            slots[idx] = row;
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Applications sitting in a take-home stage of AI-enabled jobs.
    pub async fn take_home_snapshot<'a>(
        &self,
        jobs: impl IntoIterator<Item = &'a Job>,
    ) -> Result<Vec<PipelineRow>, ReportError> {
        let mut rows = Vec::new();
        for job in jobs {
            if !job.ai_enabled() || !has_take_home_stage(job, &self.rules) {
                continue;
            }
            rows.extend(
                self.job_pipeline(job)
                    .await?
                    .into_iter()
                    .filter(|row| row.stage_type == StageType::TakeHome),
            );
        }
        Ok(rows)
    }
}

async fn fetch_row(
    source: &dyn RecruitingSource,
    application_id: &ApplicationId,
    job: &Job,
    rules: &RecruitingRules,
) -> Result<Option<PipelineRow>, ReportError> {
    match source.get_application(application_id).await {
        Ok(application) => Ok(Some(build_pipeline_row(&application, job, rules))),
        Err(SourceError::Malformed(error)) => {
            warn!(application_id = %application_id, %error, "skipping malformed application");
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

fn has_take_home_stage(job: &Job, rules: &RecruitingRules) -> bool {
    job.stages()
        .iter()
        .any(|stage| classify_stage_type(&stage.name, &rules.stage_types) == StageType::TakeHome)
}

/// AI rollout rows for every cached job, ordered by job id.
pub fn ai_rollout(index: &JobIndex) -> Vec<AiRolloutRow> {
    index.jobs().map(build_ai_rollout_row).collect()
}
