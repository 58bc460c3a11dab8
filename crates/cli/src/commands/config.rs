use serde::Serialize;

use procura_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Serialize)]
struct ConfigView {
    command: &'static str,
    status: &'static str,
    database_url: String,
    database_max_connections: u32,
    mail_smtp: String,
    mail_imap: String,
    mail_username: String,
    mail_password: &'static str,
    mail_poll_window_hours: u64,
    mail_max_concurrent_ingest: u32,
    llm_base_url: String,
    llm_model: String,
    llm_api_key: &'static str,
    server_bind: String,
    server_health_check_port: u16,
    logging_level: String,
    logging_format: &'static str,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return format!(
                "{{\"command\":\"config\",\"status\":\"error\",\"message\":\"{error}\"}}"
            );
        }
    };

    let view = ConfigView {
        command: "config",
        status: "ok",
        database_url: config.database.url.clone(),
        database_max_connections: config.database.max_connections,
        mail_smtp: format!("{}:{}", config.mail.smtp_host, config.mail.smtp_port),
        mail_imap: format!("{}:{}", config.mail.imap_host, config.mail.imap_port),
        mail_username: config.mail.username.clone(),
        mail_password: "<redacted>",
        mail_poll_window_hours: config.mail.poll_window_hours,
        mail_max_concurrent_ingest: config.mail.max_concurrent_ingest,
        llm_base_url: config.llm.base_url.clone(),
        llm_model: config.llm.model.clone(),
        llm_api_key: if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" },
        server_bind: format!("{}:{}", config.server.bind_address, config.server.port),
        server_health_check_port: config.server.health_check_port,
        logging_level: config.logging.level.clone(),
        logging_format: match config.logging.format {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        },
    };

    serde_json::to_string_pretty(&view)
        .unwrap_or_else(|error| format!("{{\"command\":\"config\",\"status\":\"error\",\"message\":\"{error}\"}}"))
}
