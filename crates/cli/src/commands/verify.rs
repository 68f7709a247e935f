use std::fs;
use std::path::Path;

use slashgate_core::config::{AppConfig, LoadOptions};
use slashgate_discord::SignatureVerifier;

use super::{CommandResult, EXIT_CHECK_FAILURE, EXIT_CONFIG_FAILURE};

const COMMAND: &str = "verify";

/// Runs the webhook's signature check offline against a captured request.
pub fn run(signature: &str, timestamp: &str, body_file: &Path) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let verifier = match SignatureVerifier::from_hex(&config.discord.public_key) {
        Ok(verifier) => verifier,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "public_key",
                format!("discord.public_key is unusable: {error}"),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let body = match fs::read(body_file) {
        Ok(body) => body,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "body_file",
                format!("failed to read {}: {error}", body_file.display()),
                EXIT_CHECK_FAILURE,
            )
        }
    };

    if verifier.verify(signature, timestamp, &body) {
        CommandResult::success(COMMAND, format!("signature valid for {} body bytes", body.len()))
    } else {
        CommandResult::failure(
            COMMAND,
            "signature_invalid",
            "signature does not match timestamp and body for the configured public key",
            EXIT_CHECK_FAILURE,
        )
    }
}
