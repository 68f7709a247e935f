//! In-memory collaborators for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use slashgate_core::{Collaborator, IntegrationError};
use slashgate_integrations::{ChannelNotifier, CreatedRecord, RecordStore, SheetAppender, TaskRecord};
use tokio::sync::mpsc;

fn rejected(service: Collaborator) -> IntegrationError {
    IntegrationError::Status { service, status: 400, detail: "rejected".to_string() }
}

#[derive(Default)]
pub(crate) struct FakeRecordStore {
    pub(crate) fail: bool,
    pub(crate) created: Mutex<Vec<TaskRecord>>,
}

impl FakeRecordStore {
    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn created(&self) -> Vec<TaskRecord> {
        self.created.lock().expect("created lock").clone()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn create_task(&self, task: &TaskRecord) -> Result<CreatedRecord, IntegrationError> {
        if self.fail {
            return Err(rejected(Collaborator::TaskStore));
        }
        self.created.lock().expect("created lock").push(task.clone());
        Ok(CreatedRecord { id: Some("page-1".to_string()), url: None })
    }
}

#[derive(Default)]
pub(crate) struct FakeSheet {
    pub(crate) fail: bool,
    pub(crate) rows: Mutex<Vec<Vec<String>>>,
}

impl FakeSheet {
    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().expect("rows lock").clone()
    }
}

#[async_trait]
impl SheetAppender for FakeSheet {
    async fn append_row(&self, row: Vec<String>) -> Result<(), IntegrationError> {
        if self.fail {
            return Err(rejected(Collaborator::Spreadsheet));
        }
        self.rows.lock().expect("rows lock").push(row);
        Ok(())
    }
}

/// Forwards every posted message to a channel so tests can await delivery.
pub(crate) struct FakeNotifier {
    sender: mpsc::UnboundedSender<(String, String)>,
}

impl FakeNotifier {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<(String, String)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ChannelNotifier for FakeNotifier {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), IntegrationError> {
        let _ = self.sender.send((channel_id.to_string(), content.to_string()));
        Ok(())
    }
}
