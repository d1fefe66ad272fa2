//! Scheduler job commands.
//!
//! Each command wires the Postgres-backed collaborators into the worker
//! pipeline and runs one job execution. The jobs themselves never return
//! errors; a `JobSetupError` can only occur before the job starts.

use std::sync::Arc;

use secrecy::SecretString;

use replenish_worker::config::{ConfigError, WorkerConfig};
use replenish_worker::db::{EmailLogStore, PgEmailLogStore, create_pool};
use replenish_worker::reminder::{Dispatcher, PruneJob, ReminderJob, SenderIdentity};
use replenish_worker::services::{PgSettings, SettingsSource, SmtpMailer};
use replenish_worker::sources::{PgOrderSource, PgProductSource, PgStockSource};

/// Errors that can occur while wiring up a job.
#[derive(Debug, thiserror::Error)]
pub enum JobSetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("SMTP setup error: {0}")]
    Smtp(String),
}

/// Run one reminder execution.
///
/// # Errors
///
/// Returns an error only if configuration, database, or SMTP setup fails
/// before the run starts.
pub async fn send_reminders() -> Result<(), JobSetupError> {
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;

    let mailer = SmtpMailer::new(&config.email).map_err(|e| JobSetupError::Smtp(e.to_string()))?;

    let settings: Arc<dyn SettingsSource> = Arc::new(PgSettings::new(pool.clone()));
    let log: Arc<dyn EmailLogStore> = Arc::new(PgEmailLogStore::new(pool.clone()));

    let dispatcher = Dispatcher::new(
        Arc::new(mailer),
        log,
        Arc::clone(&settings),
        config.store_id,
        config.media_base_url.clone(),
        SenderIdentity {
            name: config.email.from_name.clone(),
            email: config.email.from_address.clone(),
        },
    );

    let job = ReminderJob::new(
        settings,
        Arc::new(PgOrderSource::new(pool.clone())),
        Arc::new(PgProductSource::new(pool.clone())),
        Arc::new(PgStockSource::new(pool)),
        dispatcher,
        config.store_id,
    );

    job.execute().await;
    Ok(())
}

/// Run one email log cleanup pass.
///
/// Only needs the database; SMTP configuration is not required here.
///
/// # Errors
///
/// Returns an error only if database setup fails before the prune starts.
pub async fn clean_log() -> Result<(), JobSetupError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("REPLENISH_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| JobSetupError::MissingEnvVar("REPLENISH_DATABASE_URL"))?;
    let pool = create_pool(&database_url).await?;

    let job = PruneJob::new(Arc::new(PgEmailLogStore::new(pool)));
    job.execute().await;
    Ok(())
}
