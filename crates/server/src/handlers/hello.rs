use async_trait::async_trait;
use slashgate_discord::{CommandArgs, CommandHandler, HandlerError, InvocationContext};

pub const NAME: &str = "hello";

pub struct HelloCommand {
    application_id: String,
    display_name: String,
}

impl HelloCommand {
    pub fn new(application_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { application_id: application_id.into(), display_name: display_name.into() }
    }
}

#[async_trait]
impl CommandHandler for HelloCommand {
    fn name(&self) -> &str {
        NAME
    }

    async fn invoke(
        &self,
        args: &CommandArgs,
        _context: &InvocationContext,
    ) -> Result<String, HandlerError> {
        let text = match args.text("user") {
            None => "Hello!".to_string(),
            Some(user) if user == self.application_id => {
                format!("こんにちは、朕の名前は{}です", self.display_name)
            }
            Some(user) => format!("Hello, <@{user}>!"),
        };
        Ok(text)
    }
}
