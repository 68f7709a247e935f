use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use thiserror::Error;
use tracing::debug;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("public key is not valid hex")]
    InvalidHex,
    #[error("public key must be 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("public key is not a valid ed25519 point")]
    InvalidPoint,
}

/// Checks that an interaction was signed by the platform.
///
/// The signed message is the timestamp header followed by the raw request body,
/// byte for byte. Every failure collapses to `false`.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    pub fn from_hex(public_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(public_key.trim()).map_err(|_| KeyError::InvalidHex)?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            bytes.as_slice().try_into().map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPoint)?;
        Ok(Self { key })
    }

    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> bool {
        let signature = match decode_signature(signature) {
            Some(signature) => signature,
            None => {
                debug!(event_name = "interaction.verify.malformed_signature", "signature rejected");
                return false;
            }
        };

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        match self.key.verify_strict(&message, &signature) {
            Ok(()) => true,
            Err(error) => {
                debug!(
                    event_name = "interaction.verify.failed",
                    error = %error,
                    "signature verification failed"
                );
                false
            }
        }
    }

    /// Header-level entry point: a missing header is an unauthenticated request.
    pub fn verify_request(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> bool {
        match (signature, timestamp) {
            (Some(signature), Some(timestamp)) => self.verify(signature, timestamp, body),
            _ => {
                debug!(
                    event_name = "interaction.verify.missing_header",
                    has_signature = signature.is_some(),
                    has_timestamp = timestamp.is_some(),
                    "signature headers missing"
                );
                false
            }
        }
    }
}

fn decode_signature(signature: &str) -> Option<Signature> {
    let bytes = hex::decode(signature.trim()).ok()?;
    let bytes: [u8; SIGNATURE_LENGTH] = bytes.as_slice().try_into().ok()?;
    Some(Signature::from_bytes(&bytes))
}
