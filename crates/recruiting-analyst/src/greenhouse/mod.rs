//! Harvest API access.
//!
//! [`RecruitingSource`] is the seam the report generator fetches through;
//! [`GreenhouseClient`] is its HTTP implementation.

mod client;
mod paging;
mod payload;

use async_trait::async_trait;

use crate::workflows::pipeline::{Application, ApplicationId, Job, JobId, MalformedRecordError};

pub use client::GreenhouseClient;
pub use paging::next_page_url;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{resource} `{id}` was not found")]
    NotFound { resource: &'static str, id: String },
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
    #[error("GREENHOUSE_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} kept answering 429 after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },
    #[error("unexpected payload from {url}: {detail}")]
    Payload { url: String, detail: String },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

/// Read access to jobs and applications.
#[async_trait]
pub trait RecruitingSource: Send + Sync {
    async fn get_job(&self, job_id: &JobId) -> Result<Job, SourceError>;

    /// Jobs of one department (matched by name), or of every department.
    async fn list_jobs(
        &self,
        department: Option<&str>,
        include_closed: bool,
    ) -> Result<Vec<Job>, SourceError>;

    /// Active applications of a job, in listing order.
    async fn list_application_ids(&self, job_id: &JobId)
        -> Result<Vec<ApplicationId>, SourceError>;

    /// An application with its candidate name and synthesized activity feed.
    async fn get_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, SourceError>;
}
