use async_trait::async_trait;
use slashgate_discord::{CommandArgs, CommandHandler, HandlerError, InvocationContext};

pub const NAME: &str = "point";

/// Fixed-score joke command: the bot always has 3 points, everyone else 0.
pub struct PointCommand {
    application_id: String,
}

impl PointCommand {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self { application_id: application_id.into() }
    }
}

#[async_trait]
impl CommandHandler for PointCommand {
    fn name(&self) -> &str {
        NAME
    }

    async fn invoke(
        &self,
        args: &CommandArgs,
        context: &InvocationContext,
    ) -> Result<String, HandlerError> {
        let target = match args.text("user") {
            Some(user) => user,
            None => context.user_id.clone().ok_or(HandlerError::MissingContext("invoking user"))?,
        };

        if target == self.application_id {
            Ok("朕の人権ポイントは3ポイント！".to_string())
        } else {
            Ok(format!("<@{target}>の人権ポイントは0ポイント！"))
        }
    }
}
