//! YAML job cache.
//!
//! Jobs change slowly, so reports read them from a local file that
//! `jobs refresh-cache` rewrites. Applications are never cached.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::greenhouse::{RecruitingSource, SourceError};
use crate::workflows::pipeline::{Job, JobId};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to access job cache {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("job cache {} is not valid yaml: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads the cache. A missing file is an empty cache; entries that no longer
/// deserialize are skipped with a warning.
pub fn load_cached_jobs(path: &Path) -> Result<Vec<Job>, CacheError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "job cache not found; run `jobs refresh-cache`");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        warn!(path = %path.display(), "job cache is empty");
        return Ok(Vec::new());
    }

    let entries: Option<Vec<serde_yaml::Value>> =
        serde_yaml::from_str(&raw).map_err(|source| CacheError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    let jobs: Vec<Job> = entries
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_yaml::from_value::<Job>(entry) {
            Ok(job) => Some(job),
            Err(error) => {
                warn!(path = %path.display(), index, %error, "skipping unreadable cached job");
                None
            }
        })
        .collect();

    info!(path = %path.display(), jobs = jobs.len(), "loaded job cache");
    Ok(jobs)
}

/// Overwrites the cache, creating parent directories as needed.
pub fn save_cached_jobs(path: &Path, jobs: &[Job]) -> Result<(), CacheError> {
    let io_error = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let yaml = serde_yaml::to_string(jobs).map_err(|source| CacheError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(io_error)?;

    info!(path = %path.display(), jobs = jobs.len(), "saved job cache");
    Ok(())
}

/// Cached jobs keyed by id.
#[derive(Debug, Clone, Default)]
pub struct JobIndex {
    by_id: BTreeMap<JobId, Job>,
}

impl JobIndex {
    pub fn from_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        Self {
            by_id: jobs.into_iter().map(|job| (job.id().clone(), job)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CacheError> {
        load_cached_jobs(path).map(Self::from_jobs)
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.by_id.get(id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Open jobs of every listed department, deduplicated by id. An empty list
/// means every department.
pub async fn fetch_open_jobs(
    source: &dyn RecruitingSource,
    departments: &[String],
) -> Result<Vec<Job>, SourceError> {
    let mut jobs = BTreeMap::new();

    if departments.is_empty() {
        for job in source.list_jobs(None, false).await? {
            jobs.insert(job.id().clone(), job);
        }
    }

    for department in departments {
        let found = source.list_jobs(Some(department), false).await?;
        info!(department = %department, jobs = found.len(), "fetched department jobs");
        for job in found {
            jobs.insert(job.id().clone(), job);
        }
    }

    Ok(jobs.into_values().collect())
}

/// Fetches open jobs and rewrites the cache with them.
pub async fn refresh_cache(
    source: &dyn RecruitingSource,
    departments: &[String],
    path: &Path,
) -> Result<Vec<Job>, RefreshError> {
    let jobs = fetch_open_jobs(source, departments).await?;
    save_cached_jobs(path, &jobs)?;
    Ok(jobs)
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
