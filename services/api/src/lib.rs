mod cli;
mod infra;
mod preview;
mod routes;
mod server;

use sg_contact::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
