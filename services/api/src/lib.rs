mod cli;
mod forms;
mod infra;
mod routes;
mod server;

use intern_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
