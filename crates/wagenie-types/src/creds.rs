//! Authentication credentials for the messaging session.
//!
//! The credential blob is opaque to the engine: the transport emits updated
//! blobs via `CredsUpdated` events and the credential store persists them
//! verbatim. The engine itself only ever inspects the `registered` flag.

use serde::{Deserialize, Serialize};

/// Durable authentication material plus the registration flag.
///
/// Constructed in exactly two places: `Credentials::empty()` on first run,
/// and deserialization of a blob previously emitted by a live session.
/// No other component builds one by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Whether this process is paired with a messaging account.
    pub registered: bool,

    /// Opaque transport-defined authentication state.
    ///
    /// `Value::Null` until the first `CredsUpdated` event arrives.
    #[serde(default)]
    pub blob: serde_json::Value,
}

impl Credentials {
    /// Fresh, unregistered credentials for a first run.
    pub fn empty() -> Self {
        Self {
            registered: false,
            blob: serde_json::Value::Null,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::empty()
    }
}
