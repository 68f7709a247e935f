use serde::Serialize;

use crate::commands::RoutingOutcome;
use crate::interaction::InteractionKind;

pub const RESPONSE_TYPE_PONG: u8 = 1;
pub const RESPONSE_TYPE_CHANNEL_MESSAGE: u8 = 4;

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command";
pub const UNKNOWN_REQUEST_TEXT: &str = "Unknown request";
pub const COMMAND_FAILED_TEXT: &str = "Command failed";

/// The only two shapes the platform accepts on the synchronous path:
/// `{"type":1}` and `{"type":4,"data":{"content":...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    response_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<MessageData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { response_type: RESPONSE_TYPE_PONG, data: None }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            response_type: RESPONSE_TYPE_CHANNEL_MESSAGE,
            data: Some(MessageData { content: content.into() }),
        }
    }

    pub fn unknown_request() -> Self {
        Self::message(UNKNOWN_REQUEST_TEXT)
    }

    pub fn is_pong(&self) -> bool {
        self.response_type == RESPONSE_TYPE_PONG
    }

    pub fn response_type(&self) -> u8 {
        self.response_type
    }

    pub fn content(&self) -> Option<&str> {
        self.data.as_ref().map(|data| data.content.as_str())
    }
}

/// Maps a classified interaction and its routing outcome to the response envelope.
///
/// A liveness check is always answered with a pong, whatever the outcome says.
pub fn build_response(kind: &InteractionKind, outcome: Option<RoutingOutcome>) -> InteractionResponse {
    match kind {
        InteractionKind::LivenessCheck => InteractionResponse::pong(),
        InteractionKind::CommandInvocation(_) => match outcome {
            Some(RoutingOutcome::Handled(text)) => InteractionResponse::message(text),
            Some(RoutingOutcome::UnknownCommand { .. }) => {
                InteractionResponse::message(UNKNOWN_COMMAND_TEXT)
            }
            Some(RoutingOutcome::Failed { .. }) => InteractionResponse::message(COMMAND_FAILED_TEXT),
            None => InteractionResponse::unknown_request(),
        },
        InteractionKind::Other { .. } => InteractionResponse::unknown_request(),
    }
}
