use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    commands::{CommandRegistry, RoutingOutcome},
    interaction::{parse_interaction, InteractionKind},
    response::{build_response, InteractionResponse},
    verify::SignatureVerifier,
};

/// What the transport sends back for one inbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionReply {
    /// Signature missing or invalid: HTTP 401 with an empty body.
    Unauthorized,
    Respond(InteractionResponse),
}

/// Signed inbound request as seen by the pipeline.
#[derive(Clone, Copy, Debug)]
pub struct SignedRequest<'a> {
    pub signature: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub body: &'a [u8],
}

#[derive(Clone)]
pub struct InteractionService {
    verifier: SignatureVerifier,
    registry: Arc<CommandRegistry>,
}

impl InteractionService {
    pub fn new(verifier: SignatureVerifier, registry: Arc<CommandRegistry>) -> Self {
        Self { verifier, registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub async fn handle(&self, request: SignedRequest<'_>) -> InteractionReply {
        let correlation_id = Uuid::new_v4().to_string();

        if !self.verifier.verify_request(request.signature, request.timestamp, request.body) {
            warn!(
                event_name = "interaction.rejected",
                correlation_id = %correlation_id,
                outcome = "unauthorized",
                "interaction signature rejected"
            );
            return InteractionReply::Unauthorized;
        }

        let envelope = match parse_interaction(request.body) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(
                    event_name = "interaction.malformed",
                    correlation_id = %correlation_id,
                    outcome = "unknown_request",
                    error = %error,
                    "interaction envelope could not be parsed"
                );
                return InteractionReply::Respond(InteractionResponse::unknown_request());
            }
        };

        let outcome = match &envelope.kind {
            InteractionKind::CommandInvocation(invocation) => Some(
                self.registry
                    .dispatch(&invocation.name, &invocation.args, &invocation.context)
                    .await,
            ),
            InteractionKind::LivenessCheck | InteractionKind::Other { .. } => None,
        };

        let command = match &envelope.kind {
            InteractionKind::CommandInvocation(invocation) => invocation.name.as_str(),
            _ => "none",
        };
        info!(
            event_name = "interaction.completed",
            correlation_id = %correlation_id,
            kind = envelope.kind.label(),
            command,
            outcome = outcome_label(outcome.as_ref()),
            "interaction answered"
        );

        InteractionReply::Respond(build_response(&envelope.kind, outcome))
    }
}

fn outcome_label(outcome: Option<&RoutingOutcome>) -> &'static str {
    match outcome {
        None => "acknowledged",
        Some(RoutingOutcome::Handled(_)) => "handled",
        Some(RoutingOutcome::UnknownCommand { .. }) => "unknown_command",
        Some(RoutingOutcome::Failed { .. }) => "handler_failed",
    }
}
