use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use slashgate_core::config::{AppConfig, LoadOptions};
use toml::Value;

use super::{CommandResult, EXIT_CONFIG_FAILURE};

/// Where a config key's effective value came from.
struct Sources {
    file_doc: Option<Value>,
    file_path: Option<PathBuf>,
}

impl Sources {
    fn detect() -> Self {
        let file_path = detect_config_path();
        let file_doc = load_config_file_doc(file_path.as_deref());
        Self { file_doc, file_path }
    }

    fn of(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    CommandResult::success("config", render(&config, &Sources::detect()))
}

fn render(config: &AppConfig, sources: &Sources) -> String {
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut push = |key: &str, value: &str, env_keys: &[&str]| {
        lines.push(format!("- {key} = {value} (source: {})", sources.of(key, env_keys)));
    };

    push(
        "discord.application_id",
        &config.discord.application_id,
        &["SLASHGATE_DISCORD_APPLICATION_ID", "APPLICATION_ID"],
    );
    push(
        "discord.public_key",
        &config.discord.public_key,
        &["SLASHGATE_DISCORD_PUBLIC_KEY", "APPLICATION_PUBLIC_KEY"],
    );
    push(
        "discord.bot_token",
        redact(config.discord.bot_token.as_ref()),
        &["SLASHGATE_DISCORD_BOT_TOKEN", "DISCORD_TOKEN"],
    );
    push("discord.api_base_url", &config.discord.api_base_url, &["SLASHGATE_DISCORD_API_BASE_URL"]);
    push("discord.display_name", &config.discord.display_name, &["SLASHGATE_DISCORD_DISPLAY_NAME"]);
    push(
        "discord.notify_channel_id",
        config.discord.notify_channel_id.as_deref().unwrap_or("<unset>"),
        &["SLASHGATE_DISCORD_NOTIFY_CHANNEL_ID"],
    );

    push(
        "notion.token",
        redact(config.notion.token.as_ref()),
        &["SLASHGATE_NOTION_TOKEN", "NOTION_TOKEN"],
    );
    push(
        "notion.database_id",
        config.notion.database_id.as_deref().unwrap_or("<unset>"),
        &["SLASHGATE_NOTION_DATABASE_ID", "NOTION_DATABASE_ID"],
    );
    push("notion.api_base_url", &config.notion.api_base_url, &["SLASHGATE_NOTION_API_BASE_URL"]);
    push("notion.api_version", &config.notion.api_version, &["SLASHGATE_NOTION_API_VERSION"]);

    push("sheets.credential", redact(config.sheets.credential.as_ref()), &["SLASHGATE_SHEETS_CREDENTIAL"]);
    push(
        "sheets.spreadsheet_id",
        config.sheets.spreadsheet_id.as_deref().unwrap_or("<unset>"),
        &["SLASHGATE_SHEETS_SPREADSHEET_ID"],
    );
    push("sheets.range", &config.sheets.range, &["SLASHGATE_SHEETS_RANGE"]);
    push("sheets.api_base_url", &config.sheets.api_base_url, &["SLASHGATE_SHEETS_API_BASE_URL"]);

    push("server.bind_address", &config.server.bind_address, &["SLASHGATE_SERVER_BIND_ADDRESS"]);
    push("server.port", &config.server.port.to_string(), &["SLASHGATE_SERVER_PORT"]);
    push("http.timeout_ms", &config.http.timeout_ms.to_string(), &["SLASHGATE_HTTP_TIMEOUT_MS"]);
    push("http.user_agent", &config.http.user_agent, &["SLASHGATE_HTTP_USER_AGENT"]);

    push(
        "logging.level",
        &config.logging.level,
        &["SLASHGATE_LOGGING_LEVEL", "SLASHGATE_LOG_LEVEL"],
    );
    push(
        "logging.format",
        config.logging.format.as_str(),
        &["SLASHGATE_LOGGING_FORMAT", "SLASHGATE_LOG_FORMAT"],
    );

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("slashgate.toml"), PathBuf::from("config/slashgate.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
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

fn redact(secret: Option<&SecretString>) -> &'static str {
    if secret.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}
