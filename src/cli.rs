use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use recruiting_analyst::config::AppConfig;
use recruiting_analyst::error::AppError;
use recruiting_analyst::greenhouse::{GreenhouseClient, RecruitingSource};
use recruiting_analyst::jobs::{refresh_cache, JobIndex};
use recruiting_analyst::telemetry;
use recruiting_analyst::workflows::pipeline::{JobId, RecruitingRules};
use tracing::{debug, info};

use crate::commands::{self, PipelineOptions, SnapshotOptions};

#[derive(Parser, Debug)]
#[command(
    name = "analyst",
    about = "Pull Greenhouse data to build recruiting pipeline and AI rollout reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the API key by fetching the owning user
    CheckIntegration,
    /// Inspect jobs or refresh the local job cache
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Write a CSV report to stdout
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// List jobs straight from Greenhouse
    List(ListJobsArgs),
    /// Fetch open jobs of the configured departments and rewrite the cache
    RefreshCache(CacheArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// AI eligibility and enablement of every cached job
    AiRollout(CacheArgs),
    /// Pipeline status of every active application of one job
    JobPipeline(JobPipelineArgs),
    /// Applications waiting in a take-home stage of AI-enabled jobs
    TakeHomeSnapshot(CacheArgs),
}

#[derive(Args, Debug)]
struct ListJobsArgs {
    /// Department name to filter by
    #[arg(long, short = 'd')]
    department: Option<String>,
    /// Include closed jobs
    #[arg(long)]
    include_closed: bool,
    /// Number of jobs to display
    #[arg(long, short = 'l', default_value_t = 5)]
    limit: usize,
}

#[derive(Args, Debug, Default)]
struct CacheArgs {
    /// Override the configured job cache path
    #[arg(long)]
    cache_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct JobPipelineArgs {
    /// Greenhouse job id
    job_id: String,
    #[command(flatten)]
    cache: CacheArgs,
    /// Keep applications whose current stage is neither take-home nor interview
    #[arg(long)]
    include_other: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(
        environment = ?config.environment,
        cache = %config.cache.path.display(),
        "configuration loaded"
    );

    let rules = Arc::new(RecruitingRules::default());
    let connect = || -> Result<Arc<dyn RecruitingSource>, AppError> {
        Ok(Arc::new(GreenhouseClient::new(
            &config.greenhouse,
            Arc::clone(&rules),
        )?))
    };
    let cache_path = |args: &CacheArgs| {
        args.cache_path
            .clone()
            .unwrap_or_else(|| config.cache.path.clone())
    };
    let stdout = std::io::stdout();

    match cli.command {
        Command::CheckIntegration => {
            let client = GreenhouseClient::new(&config.greenhouse, Arc::clone(&rules))?;
            let user = client.current_user().await?;
            commands::print_json(stdout.lock(), &user)
        }
        Command::Jobs {
            command: JobsCommand::List(args),
        } => {
            let source = connect()?;
            commands::list_jobs(
                source.as_ref(),
                args.department.as_deref(),
                args.include_closed,
                args.limit,
                stdout.lock(),
            )
            .await
        }
        Command::Jobs {
            command: JobsCommand::RefreshCache(args),
        } => {
            let source = connect()?;
            let path = cache_path(&args);
            let jobs = refresh_cache(source.as_ref(), &config.cache.departments, &path).await?;
            info!(jobs = jobs.len(), path = %path.display(), "job cache refreshed");
            Ok(())
        }
        Command::Report {
            command: ReportCommand::AiRollout(args),
        } => {
            let index = JobIndex::load(&cache_path(&args))?;
            commands::ai_rollout_report(&index, stdout.lock())
        }
        Command::Report {
            command: ReportCommand::JobPipeline(args),
        } => {
            let index = JobIndex::load(&cache_path(&args.cache))?;
            let options = PipelineOptions {
                include_other: args.include_other,
                concurrency: config.report.fetch_concurrency,
            };
            commands::job_pipeline_report(
                connect()?,
                rules,
                &index,
                &JobId(args.job_id),
                options,
                stdout.lock(),
            )
            .await
        }
        Command::Report {
            command: ReportCommand::TakeHomeSnapshot(args),
        } => {
            let index = JobIndex::load(&cache_path(&args))?;
            let options = SnapshotOptions {
                concurrency: config.report.fetch_concurrency,
                domain: config.greenhouse.domain.clone(),
                as_of: Utc::now(),
            };
            commands::take_home_snapshot_report(connect()?, rules, &index, options, stdout.lock())
                .await
        }
    }
}
