mod cli;
mod demo;
mod infra;
mod limiter;
mod routes;
mod server;

use legal_expert::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
