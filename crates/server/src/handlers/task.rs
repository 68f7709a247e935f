use std::sync::Arc;

use async_trait::async_trait;
use slashgate_discord::{CommandArgs, CommandHandler, HandlerError, InvocationContext};
use slashgate_integrations::{ChannelNotifier, RecordStore, TaskRecord};
use tracing::warn;

pub const NAME: &str = "task";

const DEFAULT_STATUS: &str = "未着手";
const MISSING_CONTENT_TEXT: &str = "タスク名を指定してください";
const FAILED_TEXT: &str = "タスクの登録に失敗しました";

/// Channel that receives a copy of every registered task.
#[derive(Clone)]
pub struct TaskNotification {
    pub notifier: Arc<dyn ChannelNotifier>,
    pub channel_id: String,
}

pub struct TaskCommand {
    store: Arc<dyn RecordStore>,
    notification: Option<TaskNotification>,
}

impl TaskCommand {
    pub fn new(store: Arc<dyn RecordStore>, notification: Option<TaskNotification>) -> Self {
        Self { store, notification }
    }

    /// Fire-and-forget: the interaction reply never waits on the channel post.
    fn notify(&self, text: &str) {
        let Some(notification) = self.notification.clone() else {
            return;
        };
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(error) =
                notification.notifier.post_message(&notification.channel_id, &text).await
            {
                warn!(
                    event_name = "command.task.notify_failed",
                    channel_id = %notification.channel_id,
                    error_class = error.error_class(),
                    error = %error,
                    "task notification was not delivered"
                );
            }
        });
    }
}

#[async_trait]
impl CommandHandler for TaskCommand {
    fn name(&self) -> &str {
        NAME
    }

    async fn invoke(
        &self,
        args: &CommandArgs,
        _context: &InvocationContext,
    ) -> Result<String, HandlerError> {
        let Some(title) = args.text("content") else {
            return Ok(MISSING_CONTENT_TEXT.to_string());
        };
        let task = TaskRecord {
            title,
            status: args.text("status").unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            assignee: args.text("assignee"),
            department: args.text("department"),
            deadline: args.text("deadline"),
        };

        match self.store.create_task(&task).await {
            Ok(_) => {
                let text = summary(&task);
                self.notify(&text);
                Ok(text)
            }
            Err(error) => {
                warn!(
                    event_name = "command.task.failed",
                    error_class = error.error_class(),
                    error = %error,
                    "task registration failed"
                );
                Ok(FAILED_TEXT.to_string())
            }
        }
    }
}

fn summary(task: &TaskRecord) -> String {
    let mut text = format!("タスクを登録しました\nタスク名: {}\nステータス: {}\n", task.title, task.status);
    if let Some(assignee) = &task.assignee {
        text.push_str(&format!("担当者: {assignee}\n"));
    }
    if let Some(department) = &task.department {
        text.push_str(&format!("部門: {department}\n"));
    }
    if let Some(deadline) = &task.deadline {
        text.push_str(&format!("期限: {deadline}\n"));
    }
    text
}
