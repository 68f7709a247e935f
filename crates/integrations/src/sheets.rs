use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use slashgate_core::config::SheetsConfig;
use slashgate_core::{Collaborator, IntegrationError};
use tracing::{info, warn};

use crate::http::{ensure_success, join_url, transport_error};

const SERVICE: Collaborator = Collaborator::Spreadsheet;

#[async_trait]
pub trait SheetAppender: Send + Sync {
    /// Appends one row after the last filled row of the configured range.
    async fn append_row(&self, row: Vec<String>) -> Result<(), IntegrationError>;
}

/// Spreadsheet values API client. The credential is sent as an OAuth bearer
/// token and must already be minted for the spreadsheets scope.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
    credential: SecretString,
    spreadsheet_id: String,
    range: String,
}

impl SheetsClient {
    pub fn from_config(config: &SheetsConfig, client: Client) -> Result<Self, IntegrationError> {
        let (Some(credential), Some(spreadsheet_id)) = (&config.credential, &config.spreadsheet_id)
        else {
            return Err(IntegrationError::NotConfigured {
                service: SERVICE,
                reason: "sheets.credential and sheets.spreadsheet_id are both required".to_string(),
            });
        };

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            credential: credential.clone(),
            spreadsheet_id: spreadsheet_id.clone(),
            range: config.range.clone(),
        })
    }

    fn append_url(&self) -> String {
        join_url(
            &self.base_url,
            &format!(
                "v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
                self.spreadsheet_id, self.range
            ),
        )
    }
}

#[async_trait]
impl SheetAppender for SheetsClient {
    async fn append_row(&self, row: Vec<String>) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(self.credential.expose_secret())
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|error| transport_error(SERVICE, error))?;

        if let Err(error) = ensure_success(SERVICE, response).await {
            warn!(
                event_name = "integration.spreadsheet.rejected",
                error_class = error.error_class(),
                error = %error,
                "row was not appended"
            );
            return Err(error);
        }

        info!(event_name = "integration.spreadsheet.appended", range = %self.range, "row appended");
        Ok(())
    }
}
