mod cli;
pub mod commands;

use recruiting_analyst::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
