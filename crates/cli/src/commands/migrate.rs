//! Database migration command.
//!
//! # Environment Variables
//!
//! - `REPLENISH_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/worker/migrations/`.

use sqlx::PgPool;

/// Errors that can occur while running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending worker database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("REPLENISH_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("REPLENISH_DATABASE_URL"))?;

    tracing::info!("Connecting to worker database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../worker/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
