use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_NOTION_API_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_API_VERSION: &str = "2022-06-28";
pub const DEFAULT_SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub notion: NotionConfig,
    pub sheets: SheetsConfig,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    pub application_id: String,
    pub public_key: String,
    pub bot_token: Option<SecretString>,
    pub api_base_url: String,
    pub display_name: String,
    pub notify_channel_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NotionConfig {
    pub token: Option<SecretString>,
    pub database_id: Option<String>,
    pub api_base_url: String,
    pub api_version: String,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub credential: Option<SecretString>,
    pub spreadsheet_id: Option<String>,
    pub range: String,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
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

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub application_id: Option<String>,
    pub public_key: Option<String>,
    pub bot_token: Option<String>,
    pub notify_channel_id: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
    pub sheets_credential: Option<String>,
    pub sheets_spreadsheet_id: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
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
            discord: DiscordConfig {
                application_id: String::new(),
                public_key: String::new(),
                bot_token: None,
                api_base_url: DEFAULT_DISCORD_API_BASE_URL.to_string(),
                display_name: "slashgate".to_string(),
                notify_channel_id: None,
            },
            notion: NotionConfig {
                token: None,
                database_id: None,
                api_base_url: DEFAULT_NOTION_API_BASE_URL.to_string(),
                api_version: DEFAULT_NOTION_API_VERSION.to_string(),
            },
            sheets: SheetsConfig {
                credential: None,
                spreadsheet_id: None,
                range: "Sheet1!A1".to_string(),
                api_base_url: DEFAULT_SHEETS_API_BASE_URL.to_string(),
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            http: HttpConfig {
                timeout_ms: 2_500,
                user_agent: "slashgate (https://github.com/slashgate/slashgate, 0.1)".to_string(),
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("slashgate.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Both task-store settings are present, so the `task` command can be served.
    pub fn notion_enabled(&self) -> bool {
        self.notion.token.is_some() && self.notion.database_id.is_some()
    }

    /// Both spreadsheet settings are present, so the `log` command can be served.
    pub fn sheets_enabled(&self) -> bool {
        self.sheets.credential.is_some() && self.sheets.spreadsheet_id.is_some()
    }

    /// Slash commands the server registers for this configuration, sorted.
    /// `hello` and `point` are unconditional; `task` and `log` follow their
    /// collaborator settings.
    pub fn enabled_commands(&self) -> Vec<&'static str> {
        let mut commands = vec!["hello", "point"];
        if self.notion_enabled() {
            commands.push("task");
        }
        if self.sheets_enabled() {
            commands.push("log");
        }
        commands.sort_unstable();
        commands
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(discord) = patch.discord {
            if let Some(application_id) = discord.application_id {
                self.discord.application_id = application_id;
            }
            if let Some(public_key) = discord.public_key {
                self.discord.public_key = public_key;
            }
            if let Some(bot_token_value) = discord.bot_token {
                self.discord.bot_token = Some(secret_value(bot_token_value));
            }
            if let Some(api_base_url) = discord.api_base_url {
                self.discord.api_base_url = api_base_url;
            }
            if let Some(display_name) = discord.display_name {
                self.discord.display_name = display_name;
            }
            if let Some(notify_channel_id) = discord.notify_channel_id {
                self.discord.notify_channel_id = Some(notify_channel_id);
            }
        }

        if let Some(notion) = patch.notion {
            if let Some(token_value) = notion.token {
                self.notion.token = Some(secret_value(token_value));
            }
            if let Some(database_id) = notion.database_id {
                self.notion.database_id = Some(database_id);
            }
            if let Some(api_base_url) = notion.api_base_url {
                self.notion.api_base_url = api_base_url;
            }
            if let Some(api_version) = notion.api_version {
                self.notion.api_version = api_version;
            }
        }

        if let Some(sheets) = patch.sheets {
            if let Some(credential_value) = sheets.credential {
                self.sheets.credential = Some(secret_value(credential_value));
            }
            if let Some(spreadsheet_id) = sheets.spreadsheet_id {
                self.sheets.spreadsheet_id = Some(spreadsheet_id);
            }
            if let Some(range) = sheets.range {
                self.sheets.range = range;
            }
            if let Some(api_base_url) = sheets.api_base_url {
                self.sheets.api_base_url = api_base_url;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(http) = patch.http {
            if let Some(timeout_ms) = http.timeout_ms {
                self.http.timeout_ms = timeout_ms;
            }
            if let Some(user_agent) = http.user_agent {
                self.http.user_agent = user_agent;
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
        // Legacy names are what the platform's hosting templates export.
        let application_id =
            read_env("SLASHGATE_DISCORD_APPLICATION_ID").or_else(|| read_env("APPLICATION_ID"));
        if let Some(value) = application_id {
            self.discord.application_id = value;
        }
        let public_key =
            read_env("SLASHGATE_DISCORD_PUBLIC_KEY").or_else(|| read_env("APPLICATION_PUBLIC_KEY"));
        if let Some(value) = public_key {
            self.discord.public_key = value;
        }
        let bot_token = read_env("SLASHGATE_DISCORD_BOT_TOKEN").or_else(|| read_env("DISCORD_TOKEN"));
        if let Some(value) = bot_token {
            self.discord.bot_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("SLASHGATE_DISCORD_API_BASE_URL") {
            self.discord.api_base_url = value;
        }
        if let Some(value) = read_env("SLASHGATE_DISCORD_DISPLAY_NAME") {
            self.discord.display_name = value;
        }
        if let Some(value) = read_env("SLASHGATE_DISCORD_NOTIFY_CHANNEL_ID") {
            self.discord.notify_channel_id = Some(value);
        }

        let notion_token = read_env("SLASHGATE_NOTION_TOKEN").or_else(|| read_env("NOTION_TOKEN"));
        if let Some(value) = notion_token {
            self.notion.token = Some(secret_value(value));
        }
        let database_id =
            read_env("SLASHGATE_NOTION_DATABASE_ID").or_else(|| read_env("NOTION_DATABASE_ID"));
        if let Some(value) = database_id {
            self.notion.database_id = Some(value);
        }
        if let Some(value) = read_env("SLASHGATE_NOTION_API_BASE_URL") {
            self.notion.api_base_url = value;
        }
        if let Some(value) = read_env("SLASHGATE_NOTION_API_VERSION") {
            self.notion.api_version = value;
        }

        if let Some(value) = read_env("SLASHGATE_SHEETS_CREDENTIAL") {
            self.sheets.credential = Some(secret_value(value));
        }
        if let Some(value) = read_env("SLASHGATE_SHEETS_SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = Some(value);
        }
        if let Some(value) = read_env("SLASHGATE_SHEETS_RANGE") {
            self.sheets.range = value;
        }
        if let Some(value) = read_env("SLASHGATE_SHEETS_API_BASE_URL") {
            self.sheets.api_base_url = value;
        }

        if let Some(value) = read_env("SLASHGATE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SLASHGATE_SERVER_PORT") {
            self.server.port = parse_u16("SLASHGATE_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("SLASHGATE_HTTP_TIMEOUT_MS") {
            self.http.timeout_ms = parse_u64("SLASHGATE_HTTP_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read_env("SLASHGATE_HTTP_USER_AGENT") {
            self.http.user_agent = value;
        }

        let log_level =
            read_env("SLASHGATE_LOGGING_LEVEL").or_else(|| read_env("SLASHGATE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SLASHGATE_LOGGING_FORMAT").or_else(|| read_env("SLASHGATE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(application_id) = overrides.application_id {
            self.discord.application_id = application_id;
        }
        if let Some(public_key) = overrides.public_key {
            self.discord.public_key = public_key;
        }
        if let Some(bot_token) = overrides.bot_token {
            self.discord.bot_token = Some(secret_value(bot_token));
        }
        if let Some(notify_channel_id) = overrides.notify_channel_id {
            self.discord.notify_channel_id = Some(notify_channel_id);
        }
        if let Some(notion_token) = overrides.notion_token {
            self.notion.token = Some(secret_value(notion_token));
        }
        if let Some(notion_database_id) = overrides.notion_database_id {
            self.notion.database_id = Some(notion_database_id);
        }
        if let Some(sheets_credential) = overrides.sheets_credential {
            self.sheets.credential = Some(secret_value(sheets_credential));
        }
        if let Some(sheets_spreadsheet_id) = overrides.sheets_spreadsheet_id {
            self.sheets.spreadsheet_id = Some(sheets_spreadsheet_id);
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_discord(&self.discord)?;
        validate_notion(&self.notion)?;
        validate_sheets(&self.sheets)?;
        validate_server(&self.server)?;
        validate_http(&self.http)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("slashgate.toml"), PathBuf::from("config/slashgate.toml")]
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

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    let public_key = discord.public_key.trim();
    if public_key.is_empty() {
        return Err(ConfigError::Validation(
            "discord.public_key is required. Get it from https://discord.com/developers/applications > Your App > General Information > Public Key".to_string(),
        ));
    }
    let decoded_len = hex::decode(public_key).map(|bytes| bytes.len()).ok();
    if decoded_len != Some(32) {
        return Err(ConfigError::Validation(
            "discord.public_key must be a 64 character hex-encoded Ed25519 public key".to_string(),
        ));
    }

    let application_id = discord.application_id.trim();
    if application_id.is_empty() {
        return Err(ConfigError::Validation(
            "discord.application_id is required. Get it from https://discord.com/developers/applications > Your App > General Information".to_string(),
        ));
    }
    if !application_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ConfigError::Validation(
            "discord.application_id must be a numeric snowflake id".to_string(),
        ));
    }

    validate_base_url("discord.api_base_url", &discord.api_base_url)?;

    if discord.display_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.display_name must not be empty".to_string(),
        ));
    }

    if discord.notify_channel_id.is_some() {
        let missing = discord
            .bot_token
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "discord.bot_token is required when discord.notify_channel_id is set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_notion(notion: &NotionConfig) -> Result<(), ConfigError> {
    match (&notion.token, &notion.database_id) {
        (Some(_), None) => {
            return Err(ConfigError::Validation(
                "notion.database_id is required when notion.token is set".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "notion.token is required when notion.database_id is set".to_string(),
            ))
        }
        _ => {}
    }

    validate_base_url("notion.api_base_url", &notion.api_base_url)?;

    if notion.api_version.trim().is_empty() {
        return Err(ConfigError::Validation("notion.api_version must not be empty".to_string()));
    }

    Ok(())
}

fn validate_sheets(sheets: &SheetsConfig) -> Result<(), ConfigError> {
    match (&sheets.credential, &sheets.spreadsheet_id) {
        (Some(_), None) => {
            return Err(ConfigError::Validation(
                "sheets.spreadsheet_id is required when sheets.credential is set".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "sheets.credential is required when sheets.spreadsheet_id is set".to_string(),
            ))
        }
        _ => {}
    }

    validate_base_url("sheets.api_base_url", &sheets.api_base_url)?;

    if sheets.range.trim().is_empty() {
        return Err(ConfigError::Validation("sheets.range must not be empty".to_string()));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    Ok(())
}

fn validate_http(http: &HttpConfig) -> Result<(), ConfigError> {
    // The platform drops interactions that are not answered within three seconds.
    if http.timeout_ms == 0 || http.timeout_ms > 10_000 {
        return Err(ConfigError::Validation(
            "http.timeout_ms must be in range 1..=10000".to_string(),
        ));
    }

    if http.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation("http.user_agent must not be empty".to_string()));
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

fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Validation(format!("{key} must start with http:// or https://")));
    }
    Ok(())
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

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    discord: Option<DiscordPatch>,
    notion: Option<NotionPatch>,
    sheets: Option<SheetsPatch>,
    server: Option<ServerPatch>,
    http: Option<HttpPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    application_id: Option<String>,
    public_key: Option<String>,
    bot_token: Option<String>,
    api_base_url: Option<String>,
    display_name: Option<String>,
    notify_channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotionPatch {
    token: Option<String>,
    database_id: Option<String>,
    api_base_url: Option<String>,
    api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetsPatch {
    credential: Option<String>,
    spreadsheet_id: Option<String>,
    range: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpPatch {
    timeout_ms: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
