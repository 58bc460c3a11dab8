use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use procura_ai::extract::{ProposalExtractor, RfpExtractor};
use procura_ai::llm::{LlmClient, LlmError, OllamaClient};
use procura_ai::recommend::RecommendationGenerator;
use procura_core::config::{AppConfig, ConfigError, LoadOptions};
use procura_db::repositories::{SqlProposalRepository, SqlRfpRepository, SqlVendorRepository};
use procura_db::{connect_with_settings, migrations, DbPool};
use procura_ingest::IngestPipeline;
use procura_mail::inbox::ImapMailbox;
use procura_mail::outbound::{OutboundError, RfpMailer, SmtpMailer};

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[from] LlmError),
    #[error("smtp transport initialization failed: {0}")]
    Smtp(#[from] OutboundError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let llm: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(&config.llm)?);

    let rfps = Arc::new(SqlRfpRepository::new(db_pool.clone()));
    let vendors = Arc::new(SqlVendorRepository::new(db_pool.clone()));
    let proposals = Arc::new(SqlProposalRepository::new(db_pool.clone()));

    let mailer = Arc::new(RfpMailer::new(Arc::new(SmtpMailer::new(&config.mail)?)));
    let mailbox = Arc::new(ImapMailbox::new(&config.mail));

    let ingest = Arc::new(IngestPipeline::new(
        mailbox,
        ProposalExtractor::new(llm.clone()),
        rfps.clone(),
        vendors.clone(),
        proposals.clone(),
        config.mail.poll_window_hours,
        config.mail.max_concurrent_ingest,
    ));

    let state = AppState {
        rfps,
        vendors,
        proposals,
        rfp_extractor: Arc::new(RfpExtractor::new(llm.clone())),
        recommender: Arc::new(RecommendationGenerator::new(llm)),
        mailer,
        ingest,
    };

    info!(event_name = "system.bootstrap.services_wired", "service graph constructed");

    Ok(Application { config, db_pool, state })
}
