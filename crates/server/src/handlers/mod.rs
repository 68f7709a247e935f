//! The slash commands this deployment answers.
//!
//! `hello` and `point` are always registered. `task` and `log` depend on an
//! outbound collaborator and are registered only when one is available, so an
//! unconfigured service falls through to "Unknown command".

pub mod hello;
pub mod log;
pub mod point;
pub mod task;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;

use slashgate_core::AppConfig;
use slashgate_discord::{CommandRegistry, RegistrationError};
use slashgate_integrations::{ChannelNotifier, RecordStore, SheetAppender};

use self::{hello::HelloCommand, log::LogCommand, point::PointCommand, task::TaskCommand};

pub use self::task::TaskNotification;

#[derive(Clone, Default)]
pub struct Collaborators {
    pub record_store: Option<Arc<dyn RecordStore>>,
    pub spreadsheet: Option<Arc<dyn SheetAppender>>,
    pub notifier: Option<Arc<dyn ChannelNotifier>>,
}

/// Registers the commands named by `AppConfig::enabled_commands` when the
/// collaborators built from that config are passed in.
pub fn build_registry(
    config: &AppConfig,
    collaborators: Collaborators,
) -> Result<CommandRegistry, RegistrationError> {
    let application_id = config.discord.application_id.as_str();
    let mut registry = CommandRegistry::new();

    registry.register(HelloCommand::new(application_id, config.discord.display_name.as_str()))?;
    registry.register(PointCommand::new(application_id))?;

    if let Some(store) = collaborators.record_store {
        let notification = match (collaborators.notifier, &config.discord.notify_channel_id) {
            (Some(notifier), Some(channel_id)) => {
                Some(TaskNotification { notifier, channel_id: channel_id.clone() })
            }
            _ => None,
        };
        registry.register(TaskCommand::new(store, notification))?;
    }
    if let Some(sheet) = collaborators.spreadsheet {
        registry.register(LogCommand::new(sheet))?;
    }

    Ok(registry)
}
