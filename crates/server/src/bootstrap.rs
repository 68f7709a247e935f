use std::sync::Arc;

use axum::Router;
use slashgate_core::config::{AppConfig, ConfigError};
use slashgate_core::IntegrationError;
use slashgate_discord::{InteractionService, KeyError, RegistrationError, SignatureVerifier};
use slashgate_integrations::{build_client, DiscordApiClient, NotionClient, SheetsClient};
use thiserror::Error;
use tracing::info;

use crate::handlers::{build_registry, Collaborators};
use crate::{health, interactions};

pub struct Application {
    pub config: AppConfig,
    pub service: InteractionService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("discord.public_key is unusable: {0}")]
    PublicKey(#[from] KeyError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error("command registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

impl Application {
    pub fn router(&self) -> Router {
        interactions::router(self.service.clone())
            .merge(health::router(self.service.registry().names()))
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let verifier = SignatureVerifier::from_hex(&config.discord.public_key)?;
    let client = build_client(&config.http).map_err(BootstrapError::HttpClient)?;

    let mut collaborators = Collaborators::default();
    if config.notion_enabled() {
        collaborators.record_store =
            Some(Arc::new(NotionClient::from_config(&config.notion, client.clone())?));
    }
    if config.sheets_enabled() {
        collaborators.spreadsheet =
            Some(Arc::new(SheetsClient::from_config(&config.sheets, client.clone())?));
    }
    if config.discord.bot_token.is_some() {
        collaborators.notifier =
            Some(Arc::new(DiscordApiClient::from_config(&config.discord, client)?));
    }

    let registry = build_registry(&config, collaborators)?;
    info!(
        event_name = "system.bootstrap.commands_registered",
        correlation_id = "bootstrap",
        commands = ?registry.names(),
        "command handlers registered"
    );

    Ok(Application { service: InteractionService::new(verifier, Arc::new(registry)), config })
}

#[cfg(test)]
mod tests {
    use slashgate_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    async fn bootstrap(overrides: ConfigOverrides) -> Result<Application, BootstrapError> {
        let config = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/slashgate.toml".into()),
            require_file: false,
            overrides,
        })?;
        bootstrap_with_config(config).await
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_malformed_public_key() {
        let result = bootstrap(ConfigOverrides {
            application_id: Some("900".to_string()),
            public_key: Some("not-hex".to_string()),
            ..ConfigOverrides::default()
        })
        .await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("public_key"), "{message}");
    }

    #[tokio::test]
    async fn registered_commands_match_config_with_every_service() {
        let app = bootstrap(ConfigOverrides {
            application_id: Some("900".to_string()),
            public_key: Some(PUBLIC_KEY.to_string()),
            bot_token: Some("bot-token".to_string()),
            notify_channel_id: Some("42".to_string()),
            notion_token: Some("secret_abc".to_string()),
            notion_database_id: Some("db-1".to_string()),
            sheets_credential: Some("ya29.token".to_string()),
            sheets_spreadsheet_id: Some("sheet-1".to_string()),
            ..ConfigOverrides::default()
        })
        .await
        .expect("bootstrap");

        assert_eq!(app.service.registry().names(), app.config.enabled_commands());
    }

    #[tokio::test]
    async fn bootstrap_registers_commands_for_configured_services() {
        let app = bootstrap(ConfigOverrides {
            application_id: Some("900".to_string()),
            public_key: Some(PUBLIC_KEY.to_string()),
            notion_token: Some("secret_abc".to_string()),
            notion_database_id: Some("db-1".to_string()),
            ..ConfigOverrides::default()
        })
        .await
        .expect("bootstrap");

        assert_eq!(app.service.registry().names(), vec!["hello", "point", "task"]);
        assert_eq!(app.service.registry().names(), app.config.enabled_commands());
    }
}
