//! Greenhouse hiring-pipeline reconstruction and recruiting metrics.
//!
//! The pure core lives in [`workflows`]: raw activity feeds are classified into
//! [`workflows::pipeline::EventKind`]s and folded into one
//! [`workflows::pipeline::PipelineRow`] per application, while
//! [`workflows::rollout`] projects jobs into AI rollout rows. Everything that
//! touches the network or the filesystem sits around it in [`greenhouse`],
//! [`jobs`] and [`report`].

pub mod config;
pub mod error;
pub mod greenhouse;
pub mod jobs;
pub mod report;
pub mod telemetry;
pub mod workflows;
