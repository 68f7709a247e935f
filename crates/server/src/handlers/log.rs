use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use slashgate_discord::{CommandArgs, CommandHandler, HandlerError, InvocationContext};
use slashgate_integrations::SheetAppender;
use tracing::warn;

pub const NAME: &str = "log";

const MISSING_CONTENT_TEXT: &str = "記録する内容を指定してください";
const RECORDED_TEXT: &str = "スプレッドシートに記録しました";
const FAILED_TEXT: &str = "スプレッドシートへの記録に失敗しました";

/// Appends `[timestamp, username, content, category]` to the configured sheet.
pub struct LogCommand {
    sheet: Arc<dyn SheetAppender>,
}

impl LogCommand {
    pub fn new(sheet: Arc<dyn SheetAppender>) -> Self {
        Self { sheet }
    }
}

#[async_trait]
impl CommandHandler for LogCommand {
    fn name(&self) -> &str {
        NAME
    }

    async fn invoke(
        &self,
        args: &CommandArgs,
        context: &InvocationContext,
    ) -> Result<String, HandlerError> {
        let Some(content) = args.text("content") else {
            return Ok(MISSING_CONTENT_TEXT.to_string());
        };
        let username = context
            .username
            .clone()
            .or_else(|| context.user_id.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let row = vec![
            Utc::now().to_rfc3339(),
            username,
            content,
            args.text("category").unwrap_or_default(),
        ];

        match self.sheet.append_row(row).await {
            Ok(()) => Ok(RECORDED_TEXT.to_string()),
            Err(error) => {
                warn!(
                    event_name = "command.log.failed",
                    error_class = error.error_class(),
                    error = %error,
                    "spreadsheet append failed"
                );
                Ok(FAILED_TEXT.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::DateTime;
    use slashgate_discord::{CommandArgs, CommandHandler, InvocationContext};

    use super::LogCommand;
    use crate::handlers::fakes::FakeSheet;

    fn taro() -> InvocationContext {
        InvocationContext {
            user_id: Some("5".to_string()),
            username: Some("taro".to_string()),
            ..InvocationContext::default()
        }
    }

    #[tokio::test]
    async fn appends_timestamped_row() {
        let sheet = Arc::new(FakeSheet::default());
        let command = LogCommand::new(sheet.clone());
        let args = CommandArgs::new().with("content", "deployed v2").with("category", "ops");

        let text = command.invoke(&args, &taro()).await.expect("text");

        assert_eq!(text, "スプレッドシートに記録しました");
        let rows = sheet.rows();
        assert_eq!(rows.len(), 1);
        assert!(DateTime::parse_from_rfc3339(&rows[0][0]).is_ok());
        assert_eq!(rows[0][1..], ["taro", "deployed v2", "ops"]);
    }

    #[tokio::test]
    async fn category_defaults_to_empty_cell() {
        let sheet = Arc::new(FakeSheet::default());
        let command = LogCommand::new(sheet.clone());

        command.invoke(&CommandArgs::new().with("content", "note"), &taro()).await.expect("text");

        assert_eq!(sheet.rows()[0][3], "");
    }

    #[tokio::test]
    async fn missing_content_skips_the_sheet() {
        let sheet = Arc::new(FakeSheet::default());
        let command = LogCommand::new(sheet.clone());

        let text = command.invoke(&CommandArgs::new(), &taro()).await.expect("text");

        assert_eq!(text, "記録する内容を指定してください");
        assert!(sheet.rows().is_empty());
    }

    #[tokio::test]
    async fn append_failure_becomes_failure_notice() {
        let command = LogCommand::new(Arc::new(FakeSheet::failing()));

        let text = command.invoke(&CommandArgs::new().with("content", "x"), &taro()).await.expect("text");

        assert_eq!(text, "スプレッドシートへの記録に失敗しました");
    }
}
