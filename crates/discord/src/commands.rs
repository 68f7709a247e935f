use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::interaction::{CommandArgs, InvocationContext};

/// Failure a handler could not turn into a user-facing reply on its own.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("interaction is missing {0}")]
    MissingContext(&'static str),
    #[error("command handler failed: {0}")]
    Internal(String),
}

/// One slash command. Implementations are registered once at startup.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(
        &self,
        args: &CommandArgs,
        context: &InvocationContext,
    ) -> Result<String, HandlerError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingOutcome {
    Handled(String),
    UnknownCommand { name: String },
    Failed { name: String, error: HandlerError },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("command `{0}` is already registered")]
    Duplicate(String),
    #[error("command name must not be empty")]
    EmptyName,
}

/// Read-only after startup; shared behind an `Arc` across requests.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H) -> Result<(), RegistrationError>
    where
        H: CommandHandler + 'static,
    {
        let name = handler.name().to_owned();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistrationError::Duplicate(name));
        }

        self.handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// Exact, case-sensitive lookup. An unregistered name is never matched fuzzily.
    pub async fn dispatch(
        &self,
        name: &str,
        args: &CommandArgs,
        context: &InvocationContext,
    ) -> RoutingOutcome {
        let Some(handler) = self.handlers.get(name) else {
            debug!(event_name = "interaction.route.unknown", command = name, "unknown command");
            return RoutingOutcome::UnknownCommand { name: name.to_owned() };
        };

        match handler.invoke(args, context).await {
            Ok(text) => RoutingOutcome::Handled(text),
            Err(error) => {
                warn!(
                    event_name = "interaction.route.handler_failed",
                    command = name,
                    error = %error,
                    "command handler failed"
                );
                RoutingOutcome::Failed { name: name.to_owned(), error }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.handlers.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
