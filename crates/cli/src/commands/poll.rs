use std::sync::Arc;

use crate::commands::CommandResult;
use procura_ai::extract::ProposalExtractor;
use procura_ai::llm::{LlmClient, OllamaClient};
use procura_core::config::{AppConfig, LoadOptions};
use procura_db::repositories::{SqlProposalRepository, SqlRfpRepository, SqlVendorRepository};
use procura_db::{connect_with_settings, migrations};
use procura_ingest::IngestPipeline;
use procura_mail::inbox::ImapMailbox;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "poll",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "poll",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let llm: Arc<dyn LlmClient> = Arc::new(
            OllamaClient::new(&config.llm)
                .map_err(|error| ("llm_init", error.to_string(), 6u8))?,
        );

        let pipeline = IngestPipeline::new(
            Arc::new(ImapMailbox::new(&config.mail)),
            ProposalExtractor::new(llm),
            Arc::new(SqlRfpRepository::new(pool.clone())),
            Arc::new(SqlVendorRepository::new(pool.clone())),
            Arc::new(SqlProposalRepository::new(pool.clone())),
            config.mail.poll_window_hours,
            config.mail.max_concurrent_ingest,
        );

        let created = pipeline
            .poll_once()
            .await
            .map_err(|error| ("poll_cycle", error.to_string(), 7u8))?;

        pool.close().await;
        Ok::<usize, (&'static str, String, u8)>(created.len())
    });

    match result {
        Ok(created) => {
            CommandResult::success("poll", format!("poll cycle created {created} proposals"))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("poll", error_class, message, exit_code)
        }
    }
}
