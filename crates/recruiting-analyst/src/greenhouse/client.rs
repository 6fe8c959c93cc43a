use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::paging::next_page_url;
use super::payload::{candidate_name, synthesize_feed};
use super::{RecruitingSource, SourceError};
use crate::config::GreenhouseConfig;
use crate::workflows::pipeline::domain::optional_id;
use crate::workflows::pipeline::normalizer::normalize_name;
use crate::workflows::pipeline::{
    Application, ApplicationId, Job, JobId, RecruitingRules, Stage,
};

const PER_PAGE: &str = "500";
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Harvest v1 client. Authenticates with the API key as the basic-auth user.
#[derive(Clone)]
pub struct GreenhouseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
    rules: Arc<RecruitingRules>,
}

impl GreenhouseClient {
    pub fn new(config: &GreenhouseConfig, rules: Arc<RecruitingRules>) -> Result<Self, SourceError> {
        let api_key = config.api_key.clone().ok_or(SourceError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("recruiting-analyst/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
            rules,
        })
    }

    /// The user owning the API key; used to check the integration works.
    pub async fn current_user(&self) -> Result<Value, SourceError> {
        self.get_json("/users/me", &[])
            .await?
            .ok_or_else(|| SourceError::NotFound {
                resource: "user",
                id: "me".to_string(),
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a GET, waiting out 429 responses. `None` means 404.
    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<Response>, SourceError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let response = self
                .http
                .get(url)
                .basic_auth(&self.api_key, Some(""))
                .query(query)
                .send()
                .await
                .map_err(|source| SourceError::Transport {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts > self.max_retries {
                    return Err(SourceError::RateLimited {
                        url: url.to_string(),
                        attempts,
                    });
                }
                let wait = retry_after(response.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
                warn!(url, attempts, wait_secs = wait.as_secs(), "rate limited by greenhouse");
                tokio::time::sleep(wait).await;
                continue;
            }
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(SourceError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Ok(Some(response));
        }
    }

    async fn decode(url: &str, response: Response) -> Result<Value, SourceError> {
        response
            .json::<Value>()
            .await
            .map_err(|error| SourceError::Payload {
                url: url.to_string(),
                detail: error.to_string(),
            })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>, SourceError> {
        let url = self.url(path);
        match self.send(&url, query).await? {
            Some(response) => Self::decode(&url, response).await.map(Some),
            None => Ok(None),
        }
    }

    /// Collects every page of a list endpoint. A 404 on the first page yields `None`.
    async fn get_all(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Vec<Value>>, SourceError> {
        let mut query: Vec<(&str, &str)> = query.to_vec();
        query.push(("per_page", PER_PAGE));

        let mut url = self.url(path);
        let mut items = Vec::new();
        let mut first = true;
        loop {
            let page_query: &[(&str, &str)] = if first { &query } else { &[] };
            let Some(response) = self.send(&url, page_query).await? else {
                return Ok(if first { None } else { Some(items) });
            };
            let next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);

            match Self::decode(&url, response).await? {
                Value::Array(page) => items.extend(page),
                other => {
                    return Err(SourceError::Payload {
                        url,
                        detail: format!("expected a list, got {}", json_kind(&other)),
                    })
                }
            }

            match next {
                Some(next) => {
                    debug!(next = %next, fetched = items.len(), "following next page");
                    url = next;
                    first = false;
                }
                None => return Ok(Some(items)),
            }
        }
    }

    async fn department_id(&self, name: &str) -> Result<String, SourceError> {
        let wanted = normalize_name(name);
        self.get_all("/departments", &[])
            .await?
            .unwrap_or_default()
            .iter()
            .filter(|department| {
                department
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|candidate| normalize_name(candidate) == wanted)
            })
            .find_map(|department| optional_id(department.get("id")))
            .ok_or_else(|| SourceError::NotFound {
                resource: "department",
                id: name.to_string(),
            })
    }

    /// Stages of a job's hiring plan. Malformed stages are skipped.
    async fn job_stages(&self, job_id: &str) -> Result<Vec<Stage>, SourceError> {
        let raw = self
            .get_all(&format!("/jobs/{job_id}/stages"), &[])
            .await?
            .unwrap_or_default();

        Ok(raw
            .iter()
            .filter_map(|stage| match Stage::from_api(stage) {
                Ok(stage) => Some(stage),
                Err(error) => {
                    warn!(job_id, %error, "skipping malformed stage");
                    None
                }
            })
            .collect())
    }

    async fn job_from_api(&self, raw: &Value) -> Result<Job, SourceError> {
        let id = optional_id(raw.get("id")).unwrap_or_default();
        let stages = if id.is_empty() {
            Vec::new()
        } else {
            self.job_stages(&id).await?
        };
        Ok(Job::from_api(raw, stages, &self.rules)?)
    }
}

#[async_trait]
impl RecruitingSource for GreenhouseClient {
    async fn get_job(&self, job_id: &JobId) -> Result<Job, SourceError> {
        let raw = self
            .get_json(&format!("/jobs/{job_id}"), &[])
            .await?
            .ok_or_else(|| SourceError::NotFound {
                resource: "job",
                id: job_id.to_string(),
            })?;
        self.job_from_api(&raw).await
    }

    async fn list_jobs(
        &self,
        department: Option<&str>,
        include_closed: bool,
    ) -> Result<Vec<Job>, SourceError> {
        let department_id = match department {
            Some(name) => Some(self.department_id(name).await?),
            None => None,
        };

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(id) = department_id.as_deref() {
            query.push(("department_id", id));
        }
        if !include_closed {
            query.push(("status", "open"));
        }

        let raw_jobs = self.get_all("/jobs", &query).await?.unwrap_or_default();
        let mut jobs = Vec::with_capacity(raw_jobs.len());
        for raw in &raw_jobs {
            match self.job_from_api(raw).await {
                Ok(job) => jobs.push(job),
                Err(SourceError::Malformed(error)) => {
                    warn!(%error, "skipping malformed job");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(jobs)
    }

    async fn list_application_ids(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<ApplicationId>, SourceError> {
        let raw = self
            .get_all(
                "/applications",
                &[("job_id", job_id.0.as_str()), ("status", "active")],
            )
            .await?
            .unwrap_or_default();

        Ok(raw
            .iter()
            .filter_map(|application| optional_id(application.get("id")))
            .map(ApplicationId)
            .collect())
    }

    async fn get_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, SourceError> {
        let raw = self
            .get_json(&format!("/applications/{application_id}"), &[])
            .await?
            .ok_or_else(|| SourceError::NotFound {
                resource: "application",
                id: application_id.to_string(),
            })?;
        let application = Application::from_api(&raw)?;
        let candidate_id = application.candidate_id().to_string();

        let candidate_path = format!("/candidates/{candidate_id}");
        let feed_path = format!("/candidates/{candidate_id}/activity_feed");
        let interviews_path = format!("/applications/{application_id}/scheduled_interviews");
        let scorecards_path = format!("/applications/{application_id}/scorecards");
        let (candidate, activity_feed, interviews, scorecards) = tokio::try_join!(
            self.get_json(&candidate_path, &[]),
            self.get_json(&feed_path, &[]),
            self.get_all(&interviews_path, &[]),
            self.get_all(&scorecards_path, &[]),
        )?;

        let feed = synthesize_feed(
            &activity_feed.unwrap_or(Value::Null),
            &interviews.unwrap_or_default(),
            &scorecards.unwrap_or_default(),
            &self.rules.stage_types,
        );
        let name = candidate.as_ref().and_then(candidate_name);

        let application = application.with_feed(feed);
        Ok(match name {
            Some(name) => application.with_candidate_name(name),
            None => application,
        })
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn config(api_key: Option<&str>) -> GreenhouseConfig {
        GreenhouseConfig {
            api_key: api_key.map(str::to_string),
            base_url: "https://harvest.example.test/v1/".to_string(),
            domain: "app.greenhouse.io".to_string(),
            max_retries: 2,
        }
    }

    #[test]
    fn client_requires_an_api_key() {
        let result = GreenhouseClient::new(&config(None), Arc::new(RecruitingRules::default()));
        assert!(matches!(result, Err(SourceError::MissingApiKey)));
    }

    #[test]
    fn client_joins_paths_without_double_slash() {
        let client = GreenhouseClient::new(&config(Some("key")), Arc::new(RecruitingRules::default()))
            .expect("client builds");
        assert_eq!(client.url("/jobs"), "https://harvest.example.test/v1/jobs");
    }

    #[test]
    fn retry_after_reads_whole_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }
}
