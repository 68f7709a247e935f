use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use slashgate_core::config::NotionConfig;
use slashgate_core::{Collaborator, IntegrationError};
use tracing::{info, warn};

use crate::http::{ensure_success, join_url, transport_error};

const SERVICE: Collaborator = Collaborator::TaskStore;

const TITLE_PROPERTY: &str = "名前";
const STATUS_PROPERTY: &str = "status";
const ASSIGNEE_PROPERTY: &str = "assignee";
const DEPARTMENT_PROPERTY: &str = "department";
const DEADLINE_PROPERTY: &str = "日付";

/// Task as entered by the invoking user. Unset optional fields are left out of
/// the stored record entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRecord {
    pub title: String,
    pub status: String,
    pub assignee: Option<String>,
    pub department: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_task(&self, task: &TaskRecord) -> Result<CreatedRecord, IntegrationError>;
}

#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_version: String,
    token: SecretString,
    database_id: String,
}

impl NotionClient {
    pub fn from_config(config: &NotionConfig, client: Client) -> Result<Self, IntegrationError> {
        let (Some(token), Some(database_id)) = (&config.token, &config.database_id) else {
            return Err(IntegrationError::NotConfigured {
                service: SERVICE,
                reason: "notion.token and notion.database_id are both required".to_string(),
            });
        };

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_version: config.api_version.clone(),
            token: token.clone(),
            database_id: database_id.clone(),
        })
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_task(&self, task: &TaskRecord) -> Result<CreatedRecord, IntegrationError> {
        let url = join_url(&self.base_url, "v1/pages");
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", self.api_version.as_str())
            .json(&page_payload(&self.database_id, task))
            .send()
            .await
            .map_err(|error| transport_error(SERVICE, error))?;

        let response = match ensure_success(SERVICE, response).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    event_name = "integration.task_store.rejected",
                    error_class = error.error_class(),
                    error = %error,
                    "task record was not created"
                );
                return Err(error);
            }
        };

        // A created page without a readable body still counts as created.
        let created = response.json::<CreatedRecord>().await.unwrap_or_default();
        info!(
            event_name = "integration.task_store.created",
            record_id = created.id.as_deref().unwrap_or("unknown"),
            "task record created"
        );
        Ok(created)
    }
}

fn page_payload(database_id: &str, task: &TaskRecord) -> Value {
    let mut properties = Map::new();
    properties.insert(
        TITLE_PROPERTY.to_string(),
        json!({ "title": [{ "text": { "content": task.title } }] }),
    );
    properties.insert(STATUS_PROPERTY.to_string(), json!({ "select": { "name": task.status } }));
    if let Some(assignee) = &task.assignee {
        properties
            .insert(ASSIGNEE_PROPERTY.to_string(), json!({ "multi_select": [{ "name": assignee }] }));
    }
    if let Some(department) = &task.department {
        properties.insert(
            DEPARTMENT_PROPERTY.to_string(),
            json!({ "multi_select": [{ "name": department }] }),
        );
    }
    if let Some(deadline) = &task.deadline {
        properties.insert(DEADLINE_PROPERTY.to_string(), json!({ "date": { "start": deadline } }));
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(properties),
    })
}
