use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rexchat_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct FieldSources<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

impl FieldSources<'_> {
    fn line(&self, key_path: &str, value: impl AsRef<str>, env_keys: &[&str]) -> String {
        render_line(key_path, value.as_ref(), self.resolve(key_path, env_keys))
    }

    /// First env key set wins, then the config file, then the default.
    fn resolve(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let sources =
        FieldSources { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let system_prompt_path = config
        .llm
        .system_prompt_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in>".to_string());
    let relay_url = config
        .notifications
        .relay_url
        .clone()
        .unwrap_or_else(|| "<unset: log-only delivery>".to_string());

    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        sources.line(
            "server.bind_address",
            &config.server.bind_address,
            &["REXCHAT_SERVER_BIND_ADDRESS"],
        ),
        sources.line("server.port", config.server.port.to_string(), &["REXCHAT_SERVER_PORT"]),
        sources.line(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["REXCHAT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        sources.line(
            "llm.api_key",
            redact_secret(config.llm.api_key.as_ref()),
            &["REXCHAT_LLM_API_KEY", "GEMINI_API_KEY"],
        ),
        sources.line("llm.base_url", &config.llm.base_url, &["REXCHAT_LLM_BASE_URL"]),
        sources.line("llm.model", &config.llm.model, &["REXCHAT_LLM_MODEL"]),
        sources.line(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["REXCHAT_LLM_TIMEOUT_SECS"],
        ),
        sources.line(
            "llm.daily_limit",
            config.llm.daily_limit.to_string(),
            &["REXCHAT_LLM_DAILY_LIMIT", "GEMINI_DAILY_LIMIT"],
        ),
        sources.line(
            "llm.system_prompt_path",
            system_prompt_path,
            &["REXCHAT_LLM_SYSTEM_PROMPT_PATH"],
        ),
        sources.line(
            "responder.contact_max_tokens",
            config.responder.contact_max_tokens.to_string(),
            &["REXCHAT_RESPONDER_CONTACT_MAX_TOKENS"],
        ),
        sources.line(
            "notifications.staff_email",
            &config.notifications.staff_email,
            &["REXCHAT_NOTIFICATIONS_STAFF_EMAIL", "HR_EMAIL"],
        ),
        sources.line(
            "notifications.from_address",
            &config.notifications.from_address,
            &["REXCHAT_NOTIFICATIONS_FROM_ADDRESS"],
        ),
        sources.line("notifications.relay_url", relay_url, &["REXCHAT_NOTIFICATIONS_RELAY_URL"]),
        sources.line(
            "notifications.relay_token",
            redact_secret(config.notifications.relay_token.as_ref()),
            &["REXCHAT_NOTIFICATIONS_RELAY_TOKEN"],
        ),
        sources.line(
            "notifications.timeout_secs",
            config.notifications.timeout_secs.to_string(),
            &["REXCHAT_NOTIFICATIONS_TIMEOUT_SECS"],
        ),
        sources.line(
            "logging.level",
            &config.logging.level,
            &["REXCHAT_LOGGING_LEVEL", "REXCHAT_LOG_LEVEL"],
        ),
        sources.line(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["REXCHAT_LOGGING_FORMAT", "REXCHAT_LOG_FORMAT"],
        ),
    ];

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("rexchat.toml"), PathBuf::from("config/rexchat.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret {
        None => "<unset>".to_string(),
        Some(secret) if secret.expose_secret().trim().is_empty() => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
    }
}
