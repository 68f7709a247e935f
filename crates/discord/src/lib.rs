//! Discord Interactions - signed webhook protocol core
//!
//! This crate turns one signed HTTP request from the platform into exactly one
//! interaction response:
//! - **Verification** (`verify`) - Ed25519 over `timestamp || raw body`
//! - **Envelope parsing** (`interaction`) - ping / application command / other
//! - **Routing** (`commands`) - name → `CommandHandler` registry, exact match only
//! - **Responses** (`response`) - `{"type":1}` or `{"type":4,"data":{"content":..}}`
//! - **Pipeline** (`service`) - the four steps above, transport-agnostic
//!
//! # Architecture
//!
//! ```text
//! HTTP POST → SignatureVerifier ─✗→ 401
//!                 ↓ ✓
//!           parse_interaction → ping ──────────────→ pong
//!                 ↓ command
//!           CommandRegistry::dispatch → handler → build_response → 200
//! ```
//!
//! # Key Types
//!
//! - `InteractionService` - verification, parsing, routing and response shaping
//! - `CommandRegistry` - read-only map of command name to handler
//! - `CommandHandler` - trait each slash command implements

pub mod commands;
pub mod interaction;
pub mod response;
pub mod service;
pub mod verify;

pub use commands::{CommandHandler, CommandRegistry, HandlerError, RegistrationError, RoutingOutcome};
pub use interaction::{
    parse_interaction, CommandArgs, CommandInvocation, EnvelopeError, InteractionEnvelope,
    InteractionKind, InvocationContext, OptionValue,
};
pub use response::{build_response, InteractionResponse};
pub use service::{InteractionReply, InteractionService, SignedRequest};
pub use verify::{KeyError, SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
