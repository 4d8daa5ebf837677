//! Pairing controller: obtains a human-presentable pairing code (or QR
//! payload) when no valid credentials exist.
//!
//! Called exactly once per session-creation cycle while unregistered; the
//! controller never retries internally -- restarting session creation is
//! the supervisor's decision.

use tracing::info;

use wagenie_types::error::PairingError;
use wagenie_types::pairing::{PairingDisplay, PairingMode};

use crate::session::BoxSession;

/// Drives the configured pairing flow against a freshly created session.
#[derive(Debug, Clone)]
pub struct PairingController {
    mode: PairingMode,
}

impl PairingController {
    pub fn new(mode: PairingMode) -> Self {
        Self { mode }
    }

    /// Request pairing material for an unregistered session.
    ///
    /// Precondition: `!session.registered()`. A request against a
    /// registered session is rejected with `AlreadyRegistered`, not
    /// retried.
    pub async fn request(&self, session: &BoxSession) -> Result<PairingDisplay, PairingError> {
        if session.registered() {
            return Err(PairingError::AlreadyRegistered);
        }

        match &self.mode {
            PairingMode::Code { phone_number } => {
                let identifier = normalize_identifier(phone_number)?;
                let code = session
                    .request_pairing_code(&identifier)
                    .await
                    .map_err(|e| PairingError::Transport(e.to_string()))?;
                info!(%code, "pairing code issued");
                Ok(PairingDisplay::Code { code })
            }
            // The scannable payload arrives later as a session event; the
            // presentation surface renders a waiting state until then.
            PairingMode::Qr => Ok(PairingDisplay::AwaitingQr),
        }
    }
}

/// Validate and normalize a phone-number identifier: optional leading
/// `+`, then 8 to 15 ASCII digits (E.164 length bounds).
fn normalize_identifier(raw: &str) -> Result<String, PairingError> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PairingError::IdentifierInvalid(raw.to_string()));
    }
    if !(8..=15).contains(&digits.len()) {
        return Err(PairingError::IdentifierInvalid(raw.to_string()));
    }
    Ok(digits.to_string())
}
