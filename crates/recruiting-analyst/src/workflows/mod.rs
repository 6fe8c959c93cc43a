pub mod pipeline;
pub mod rollout;

pub use pipeline::{build_pipeline_row, PipelineRow, RecruitingRules};
pub use rollout::{build_ai_rollout_row, AiRolloutRow};
