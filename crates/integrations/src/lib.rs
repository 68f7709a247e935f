//! Outbound clients for the services command handlers call.
//!
//! Each collaborator sits behind a small async trait so handlers can be tested
//! with in-memory fakes; the reqwest implementations share one pooled client.

pub mod http;
pub mod notion;
pub mod platform;
pub mod sheets;

#[cfg(test)]
mod testing;

pub use http::build_client;
pub use notion::{CreatedRecord, NotionClient, RecordStore, TaskRecord};
pub use platform::{ChannelNotifier, DiscordApiClient};
pub use sheets::{SheetAppender, SheetsClient};
