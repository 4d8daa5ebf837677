//! Pairing types: the one-time association of this process with a user's
//! messaging account.
//!
//! Two presentation modes exist in the wild: a short alphanumeric code the
//! user types into their device (tied to a phone number), and a scannable
//! QR-style payload emitted asynchronously by the session. Both are valid;
//! the mode is a configuration choice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Short alphanumeric code the user types under "Linked Devices".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingCode(pub String);

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which pairing flow to run when no valid credentials exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PairingMode {
    /// Request a typed code bound to a phone-number identifier.
    Code { phone_number: String },

    /// Wait for the session to emit a scannable payload.
    Qr,
}

/// What the presentation surface should currently render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "display", rename_all = "snake_case")]
pub enum PairingDisplay {
    /// A typed code is ready.
    Code { code: PairingCode },

    /// QR mode: the payload has not arrived yet.
    AwaitingQr,

    /// QR mode: scannable payload ready.
    QrPayload { payload: String },

    /// Pairing failed; human-readable detail for the operator.
    Failed { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_mode_serde_tagged() {
        let mode = PairingMode::Code {
            phone_number: "15551234567".to_string(),
        };
        let encoded = serde_json::to_string(&mode).unwrap();
        assert!(encoded.contains(r#""mode":"code""#));
        let decoded: PairingMode = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, mode);
    }

    #[test]
    fn pairing_display_code_roundtrip() {
        let display = PairingDisplay::Code {
            code: PairingCode("ABCD-1234".to_string()),
        };
        let encoded = serde_json::to_string(&display).unwrap();
        let decoded: PairingDisplay = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, display);
    }

    #[test]
    fn pairing_code_display() {
        assert_eq!(PairingCode("XY12AB34".to_string()).to_string(), "XY12AB34");
    }
}
