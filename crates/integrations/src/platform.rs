use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use slashgate_core::config::DiscordConfig;
use slashgate_core::{Collaborator, IntegrationError};
use tracing::{info, warn};

use crate::http::{ensure_success, join_url, transport_error};

const SERVICE: Collaborator = Collaborator::ChatPlatform;

#[async_trait]
pub trait ChannelNotifier: Send + Sync {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), IntegrationError>;
}

/// Bot-authenticated client for the platform REST API.
#[derive(Clone)]
pub struct DiscordApiClient {
    client: Client,
    base_url: String,
    bot_token: SecretString,
}

impl DiscordApiClient {
    pub fn from_config(config: &DiscordConfig, client: Client) -> Result<Self, IntegrationError> {
        let Some(bot_token) = &config.bot_token else {
            return Err(IntegrationError::NotConfigured {
                service: SERVICE,
                reason: "discord.bot_token is required to post messages".to_string(),
            });
        };

        Ok(Self { client, base_url: config.api_base_url.clone(), bot_token: bot_token.clone() })
    }
}

#[async_trait]
impl ChannelNotifier for DiscordApiClient {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), IntegrationError> {
        let url = join_url(&self.base_url, &format!("channels/{channel_id}/messages"));
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token.expose_secret()))
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(|error| transport_error(SERVICE, error))?;

        if let Err(error) = ensure_success(SERVICE, response).await {
            warn!(
                event_name = "integration.chat_platform.rejected",
                channel_id,
                error_class = error.error_class(),
                error = %error,
                "channel message was not posted"
            );
            return Err(error);
        }

        info!(event_name = "integration.chat_platform.posted", channel_id, "channel message posted");
        Ok(())
    }
}
