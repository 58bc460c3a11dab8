use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub imap_host: String,
    pub imap_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: Option<String>,
    /// Inbound search window: unseen messages newer than this many hours.
    pub poll_window_hours: u64,
    /// Cap on simultaneously processed inbound messages per poll cycle.
    pub max_concurrent_ingest: u32,
}

impl MailConfig {
    pub fn sender_address(&self) -> &str {
        self.from_address.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub mail_username: Option<String>,
    pub mail_password: Option<String>,
    pub max_concurrent_ingest: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://procura.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            mail: MailConfig {
                smtp_host: "smtp.gmail.com".to_string(),
                smtp_port: 587,
                imap_host: "imap.gmail.com".to_string(),
                imap_port: 993,
                username: String::new(),
                password: String::new().into(),
                from_address: None,
                poll_window_hours: 24,
                max_concurrent_ingest: 4,
            },
            llm: LlmConfig {
                base_url: "http://localhost:11434".to_string(),
                api_key: None,
                model: "llama3.1".to_string(),
                timeout_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
                cors_allowed_origin: Some("http://localhost:3000".to_string()),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("procura.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(mail) = patch.mail {
            if let Some(smtp_host) = mail.smtp_host {
                self.mail.smtp_host = smtp_host;
            }
            if let Some(smtp_port) = mail.smtp_port {
                self.mail.smtp_port = smtp_port;
            }
            if let Some(imap_host) = mail.imap_host {
                self.mail.imap_host = imap_host;
            }
            if let Some(imap_port) = mail.imap_port {
                self.mail.imap_port = imap_port;
            }
            if let Some(username) = mail.username {
                self.mail.username = username;
            }
            if let Some(mail_password_value) = mail.password {
                self.mail.password = secret_value(mail_password_value);
            }
            if let Some(from_address) = mail.from_address {
                self.mail.from_address = Some(from_address);
            }
            if let Some(poll_window_hours) = mail.poll_window_hours {
                self.mail.poll_window_hours = poll_window_hours;
            }
            if let Some(max_concurrent_ingest) = mail.max_concurrent_ingest {
                self.mail.max_concurrent_ingest = max_concurrent_ingest;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(cors_allowed_origin) = server.cors_allowed_origin {
                self.server.cors_allowed_origin = Some(cors_allowed_origin);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROCURA_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("PROCURA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("PROCURA_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("PROCURA_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROCURA_MAIL_SMTP_HOST") {
            self.mail.smtp_host = value;
        }
        if let Some(value) = read_env("PROCURA_MAIL_SMTP_PORT") {
            self.mail.smtp_port = parse_u16("PROCURA_MAIL_SMTP_PORT", &value)?;
        }
        if let Some(value) = read_env("PROCURA_MAIL_IMAP_HOST") {
            self.mail.imap_host = value;
        }
        if let Some(value) = read_env("PROCURA_MAIL_IMAP_PORT") {
            self.mail.imap_port = parse_u16("PROCURA_MAIL_IMAP_PORT", &value)?;
        }
        if let Some(value) = read_env("PROCURA_MAIL_USERNAME") {
            self.mail.username = value;
        }
        if let Some(value) = read_env("PROCURA_MAIL_PASSWORD") {
            self.mail.password = secret_value(value);
        }
        if let Some(value) = read_env("PROCURA_MAIL_FROM_ADDRESS") {
            self.mail.from_address = Some(value);
        }
        if let Some(value) = read_env("PROCURA_MAIL_POLL_WINDOW_HOURS") {
            self.mail.poll_window_hours = parse_u64("PROCURA_MAIL_POLL_WINDOW_HOURS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_MAIL_MAX_CONCURRENT_INGEST") {
            self.mail.max_concurrent_ingest =
                parse_u32("PROCURA_MAIL_MAX_CONCURRENT_INGEST", &value)?;
        }

        if let Some(value) = read_env("PROCURA_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("PROCURA_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PROCURA_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("PROCURA_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("PROCURA_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROCURA_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PROCURA_SERVER_PORT") {
            self.server.port = parse_u16("PROCURA_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PROCURA_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port = parse_u16("PROCURA_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("PROCURA_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PROCURA_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_SERVER_CORS_ALLOWED_ORIGIN") {
            self.server.cors_allowed_origin = Some(value);
        }

        let log_level = read_env("PROCURA_LOGGING_LEVEL").or_else(|| read_env("PROCURA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROCURA_LOGGING_FORMAT").or_else(|| read_env("PROCURA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(mail_username) = overrides.mail_username {
            self.mail.username = mail_username;
        }
        if let Some(mail_password) = overrides.mail_password {
            self.mail.password = secret_value(mail_password);
        }
        if let Some(max_concurrent_ingest) = overrides.max_concurrent_ingest {
            self.mail.max_concurrent_ingest = max_concurrent_ingest;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_mail(&self.mail)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("procura.toml"), PathBuf::from("config/procura.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_mail(mail: &MailConfig) -> Result<(), ConfigError> {
    if mail.smtp_host.trim().is_empty() || mail.imap_host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mail.smtp_host and mail.imap_host are required".to_string(),
        ));
    }
    if mail.smtp_port == 0 || mail.imap_port == 0 {
        return Err(ConfigError::Validation(
            "mail.smtp_port and mail.imap_port must be greater than zero".to_string(),
        ));
    }

    if mail.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mail.username is required (the mailbox account used for outbound and inbound mail)"
                .to_string(),
        ));
    }
    if mail.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "mail.password is required (use an app password for hosted providers)".to_string(),
        ));
    }

    if mail.poll_window_hours == 0 || mail.poll_window_hours > 168 {
        return Err(ConfigError::Validation(
            "mail.poll_window_hours must be in range 1..=168".to_string(),
        ));
    }
    if mail.max_concurrent_ingest == 0 || mail.max_concurrent_ingest > 64 {
        return Err(ConfigError::Validation(
            "mail.max_concurrent_ingest must be in range 1..=64".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("llm.base_url is required".to_string()));
    }
    if !llm.base_url.starts_with("http://") && !llm.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }
    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model is required".to_string()));
    }
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }
    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.port and server.health_check_port must differ".to_string(),
        ));
    }
    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    mail: Option<MailPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MailPatch {
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    imap_host: Option<String>,
    imap_port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    from_address: Option<String>,
    poll_window_hours: Option<u64>,
    max_concurrent_ingest: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    cors_allowed_origin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_MAIL_USERNAME", "procurement@example.com");
        env::set_var("TEST_MAIL_PASSWORD", "app-password-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("procura.toml");
            fs::write(
                &path,
                r#"
[mail]
username = "${TEST_MAIL_USERNAME}"
password = "${TEST_MAIL_PASSWORD}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.mail.username == "procurement@example.com",
                "mail username should be loaded from environment",
            )?;
            ensure(
                config.mail.password.expose_secret() == "app-password-from-env",
                "mail password should be loaded from environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_MAIL_USERNAME", "TEST_MAIL_PASSWORD"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PROCURA_MAIL_USERNAME", "ops@example.com");
        env::set_var("PROCURA_MAIL_PASSWORD", "secret");
        env::set_var("PROCURA_LOG_LEVEL", "warn");
        env::set_var("PROCURA_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&[
            "PROCURA_MAIL_USERNAME",
            "PROCURA_MAIL_PASSWORD",
            "PROCURA_LOG_LEVEL",
            "PROCURA_LOG_FORMAT",
        ]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PROCURA_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("PROCURA_MAIL_USERNAME", "env@example.com");
        env::set_var("PROCURA_MAIL_PASSWORD", "env-password");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("procura.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[mail]
username = "file@example.com"
password = "file-password"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.mail.username == "env@example.com",
                "env mail username should win over file and defaults",
            )?;
            ensure(
                config.mail.password.expose_secret() == "env-password",
                "env mail password should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["PROCURA_DATABASE_URL", "PROCURA_MAIL_USERNAME", "PROCURA_MAIL_PASSWORD"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PROCURA_MAIL_USERNAME", "ops@example.com");
        // password left empty on purpose

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("mail.password")
            );
            ensure(has_message, "validation failure should mention mail.password")
        })();

        clear_vars(&["PROCURA_MAIL_USERNAME"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PROCURA_MAIL_USERNAME", "ops@example.com");
        env::set_var("PROCURA_MAIL_PASSWORD", "mail-secret-value");
        env::set_var("PROCURA_LLM_API_KEY", "llm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("mail-secret-value"),
                "debug output should not contain the mail password",
            )?;
            ensure(
                !debug.contains("llm-secret-value"),
                "debug output should not contain the llm api key",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["PROCURA_MAIL_USERNAME", "PROCURA_MAIL_PASSWORD", "PROCURA_LLM_API_KEY"]);
        result
    }

    #[test]
    fn ingest_concurrency_cap_is_bounded() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PROCURA_MAIL_USERNAME", "ops@example.com");
        env::set_var("PROCURA_MAIL_PASSWORD", "secret");
        env::set_var("PROCURA_MAIL_MAX_CONCURRENT_INGEST", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("zero ingest concurrency should be rejected".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::Validation(ref message)
                        if message.contains("max_concurrent_ingest")
                ),
                "validation failure should mention max_concurrent_ingest",
            )
        })();

        clear_vars(&[
            "PROCURA_MAIL_USERNAME",
            "PROCURA_MAIL_PASSWORD",
            "PROCURA_MAIL_MAX_CONCURRENT_INGEST",
        ]);
        result
    }
}
