use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub responder: ResponderConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub daily_limit: u32,
    pub system_prompt_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ResponderConfig {
    pub contact_max_tokens: usize,
}

#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub staff_email: String,
    pub from_address: String,
    pub relay_url: Option<String>,
    pub relay_token: Option<SecretString>,
    pub timeout_secs: u64,
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
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub llm_api_key: Option<String>,
    pub llm_daily_limit: Option<u32>,
    pub staff_email: Option<String>,
    pub relay_url: Option<String>,
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

/// Every environment variable the loader reads, aliases included.
pub const ENV_KEYS: &[&str] = &[
    "REXCHAT_SERVER_BIND_ADDRESS",
    "REXCHAT_SERVER_PORT",
    "REXCHAT_SERVER_GRACEFUL_SHUTDOWN_SECS",
    "REXCHAT_LLM_API_KEY",
    "GEMINI_API_KEY",
    "REXCHAT_LLM_BASE_URL",
    "REXCHAT_LLM_MODEL",
    "REXCHAT_LLM_TIMEOUT_SECS",
    "REXCHAT_LLM_DAILY_LIMIT",
    "GEMINI_DAILY_LIMIT",
    "REXCHAT_LLM_SYSTEM_PROMPT_PATH",
    "REXCHAT_RESPONDER_CONTACT_MAX_TOKENS",
    "REXCHAT_NOTIFICATIONS_STAFF_EMAIL",
    "HR_EMAIL",
    "REXCHAT_NOTIFICATIONS_FROM_ADDRESS",
    "REXCHAT_NOTIFICATIONS_RELAY_URL",
    "REXCHAT_NOTIFICATIONS_RELAY_TOKEN",
    "REXCHAT_NOTIFICATIONS_TIMEOUT_SECS",
    "REXCHAT_LOGGING_LEVEL",
    "REXCHAT_LOG_LEVEL",
    "REXCHAT_LOGGING_FORMAT",
    "REXCHAT_LOG_FORMAT",
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-2.5-flash".to_string(),
                timeout_secs: 30,
                daily_limit: 50,
                system_prompt_path: None,
            },
            responder: ResponderConfig { contact_max_tokens: 5 },
            notifications: NotificationConfig {
                staff_email: String::new(),
                from_address: "Rex Security Assistant <no-reply@rexsecuritypatrols.com>"
                    .to_string(),
                relay_url: None,
                relay_token: None,
                timeout_secs: 15,
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("rexchat.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(daily_limit) = llm.daily_limit {
                self.llm.daily_limit = daily_limit;
            }
            if let Some(system_prompt_path) = llm.system_prompt_path {
                self.llm.system_prompt_path = Some(system_prompt_path);
            }
        }

        if let Some(responder) = patch.responder {
            if let Some(contact_max_tokens) = responder.contact_max_tokens {
                self.responder.contact_max_tokens = contact_max_tokens;
            }
        }

        if let Some(notifications) = patch.notifications {
            if let Some(staff_email) = notifications.staff_email {
                self.notifications.staff_email = staff_email;
            }
            if let Some(from_address) = notifications.from_address {
                self.notifications.from_address = from_address;
            }
            if let Some(relay_url) = notifications.relay_url {
                self.notifications.relay_url = Some(relay_url);
            }
            if let Some(relay_token_value) = notifications.relay_token {
                self.notifications.relay_token = Some(secret_value(relay_token_value));
            }
            if let Some(timeout_secs) = notifications.timeout_secs {
                self.notifications.timeout_secs = timeout_secs;
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
        if let Some(value) = read_env("REXCHAT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("REXCHAT_SERVER_PORT") {
            self.server.port = parse_u16("REXCHAT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("REXCHAT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("REXCHAT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("REXCHAT_LLM_API_KEY").or_else(|| read_env("GEMINI_API_KEY"))
        {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("REXCHAT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("REXCHAT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("REXCHAT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("REXCHAT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some((key, value)) = read_env_with_alias("REXCHAT_LLM_DAILY_LIMIT", "GEMINI_DAILY_LIMIT")
        {
            self.llm.daily_limit = parse_u32(key, &value)?;
        }
        if let Some(value) = read_env("REXCHAT_LLM_SYSTEM_PROMPT_PATH") {
            self.llm.system_prompt_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("REXCHAT_RESPONDER_CONTACT_MAX_TOKENS") {
            self.responder.contact_max_tokens =
                parse_usize("REXCHAT_RESPONDER_CONTACT_MAX_TOKENS", &value)?;
        }

        if let Some(value) =
            read_env("REXCHAT_NOTIFICATIONS_STAFF_EMAIL").or_else(|| read_env("HR_EMAIL"))
        {
            self.notifications.staff_email = value;
        }
        if let Some(value) = read_env("REXCHAT_NOTIFICATIONS_FROM_ADDRESS") {
            self.notifications.from_address = value;
        }
        if let Some(value) = read_env("REXCHAT_NOTIFICATIONS_RELAY_URL") {
            self.notifications.relay_url = Some(value);
        }
        if let Some(value) = read_env("REXCHAT_NOTIFICATIONS_RELAY_TOKEN") {
            self.notifications.relay_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("REXCHAT_NOTIFICATIONS_TIMEOUT_SECS") {
            self.notifications.timeout_secs =
                parse_u64("REXCHAT_NOTIFICATIONS_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("REXCHAT_LOGGING_LEVEL").or_else(|| read_env("REXCHAT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REXCHAT_LOGGING_FORMAT").or_else(|| read_env("REXCHAT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(daily_limit) = overrides.llm_daily_limit {
            self.llm.daily_limit = daily_limit;
        }
        if let Some(staff_email) = overrides.staff_email {
            self.notifications.staff_email = staff_email;
        }
        if let Some(relay_url) = overrides.relay_url {
            self.notifications.relay_url = Some(relay_url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_llm(&self.llm)?;
        validate_responder(&self.responder)?;
        validate_notifications(&self.notifications)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("rexchat.toml"), PathBuf::from("config/rexchat.toml")]
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

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let missing_key =
        llm.api_key.as_ref().map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing_key {
        return Err(ConfigError::Validation(
            "llm.api_key is required (set REXCHAT_LLM_API_KEY or GEMINI_API_KEY)".to_string(),
        ));
    }

    if !llm.base_url.starts_with("http://") && !llm.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_responder(responder: &ResponderConfig) -> Result<(), ConfigError> {
    if responder.contact_max_tokens == 0 {
        return Err(ConfigError::Validation(
            "responder.contact_max_tokens must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_notifications(notifications: &NotificationConfig) -> Result<(), ConfigError> {
    let staff_email = notifications.staff_email.trim();
    if staff_email.is_empty() {
        return Err(ConfigError::Validation(
            "notifications.staff_email is required (set REXCHAT_NOTIFICATIONS_STAFF_EMAIL or HR_EMAIL)"
                .to_string(),
        ));
    }
    if !staff_email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "notifications.staff_email `{staff_email}` is not an email address"
        )));
    }

    if let Some(relay_url) = &notifications.relay_url {
        if !relay_url.starts_with("http://") && !relay_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "notifications.relay_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if notifications.timeout_secs == 0 || notifications.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "notifications.timeout_secs must be in range 1..=300".to_string(),
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

fn read_env_with_alias(
    key: &'static str,
    alias: &'static str,
) -> Option<(&'static str, String)> {
    read_env(key).map(|value| (key, value)).or_else(|| read_env(alias).map(|value| (alias, value)))
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

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    llm: Option<LlmPatch>,
    responder: Option<ResponderPatch>,
    notifications: Option<NotificationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    daily_limit: Option<u32>,
    system_prompt_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponderPatch {
    contact_max_tokens: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationPatch {
    staff_email: Option<String>,
    from_address: Option<String>,
    relay_url: Option<String>,
    relay_token: Option<String>,
    timeout_secs: Option<u64>,
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

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, ENV_KEYS};

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
        clear_vars(ENV_KEYS);

        env::set_var("TEST_GEMINI_KEY", "key-from-env");
        env::set_var("TEST_STAFF_EMAIL", "ops@example.com");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("rexchat.toml");
            fs::write(
                &path,
                r#"
[llm]
api_key = "${TEST_GEMINI_KEY}"
daily_limit = 10

[notifications]
staff_email = "${TEST_STAFF_EMAIL}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "key-from-env")
                    == Some(true),
                "api key should be loaded from environment",
            )?;
            ensure(config.llm.daily_limit == 10, "daily limit should come from the file")?;
            ensure(
                config.notifications.staff_email == "ops@example.com",
                "staff email should be interpolated",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_GEMINI_KEY", "TEST_STAFF_EMAIL"]);
        result
    }

    #[test]
    fn legacy_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        env::set_var("GEMINI_API_KEY", "legacy-key");
        env::set_var("GEMINI_DAILY_LIMIT", "7");
        env::set_var("HR_EMAIL", "hr@example.com");
        env::set_var("REXCHAT_LOG_LEVEL", "warn");
        env::set_var("REXCHAT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.daily_limit == 7, "daily limit alias should apply")?;
            ensure(config.notifications.staff_email == "hr@example.com", "HR_EMAIL should apply")?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn invalid_daily_limit_alias_reports_the_alias_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        env::set_var("GEMINI_DAILY_LIMIT", "lots");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "GEMINI_DAILY_LIMIT", "error should name the alias")
            }
            _ => Err("expected invalid override error".to_string()),
        };

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        env::set_var("REXCHAT_LLM_DAILY_LIMIT", "20");
        env::set_var("REXCHAT_LLM_API_KEY", "key-from-env");
        env::set_var("REXCHAT_NOTIFICATIONS_STAFF_EMAIL", "env@example.com");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("rexchat.toml");
            fs::write(
                &path,
                r#"
[llm]
api_key = "key-from-file"
daily_limit = 5
model = "gemini-file-model"

[notifications]
staff_email = "file@example.com"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    llm_daily_limit: Some(3),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.daily_limit == 3, "override daily limit should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.llm.model == "gemini-file-model", "file model should beat default")?;
            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "key-from-env")
                    == Some(true),
                "env api key should win over file and defaults",
            )?;
            ensure(
                config.notifications.staff_email == "env@example.com",
                "env staff email should win over file",
            )?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        env::set_var("REXCHAT_NOTIFICATIONS_STAFF_EMAIL", "ops@example.com");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("llm.api_key")
            );
            ensure(has_message, "validation failure should mention llm.api_key")
        })();

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn staff_email_must_look_like_an_address() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        let result = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                llm_api_key: Some("key".to_string()),
                staff_email: Some("operations".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Err(ConfigError::Validation(message)) => ensure(
                message.contains("notifications.staff_email"),
                "validation failure should mention notifications.staff_email",
            ),
            _ => Err("expected staff email validation failure".to_string()),
        };

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ENV_KEYS);

        env::set_var("REXCHAT_LLM_API_KEY", "gemini-secret-value");
        env::set_var("REXCHAT_NOTIFICATIONS_RELAY_TOKEN", "relay-secret-value");
        env::set_var("REXCHAT_NOTIFICATIONS_STAFF_EMAIL", "ops@example.com");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("gemini-secret-value"), "debug output should not contain api key")?;
            ensure(
                !debug.contains("relay-secret-value"),
                "debug output should not contain relay token",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            ensure(config.llm.daily_limit == 50, "default daily limit should be 50")?;
            ensure(config.responder.contact_max_tokens == 5, "default contact threshold is 5")?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }
}
