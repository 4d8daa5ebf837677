//! Session-level domain types: connection states, inbound/outbound
//! messages, and the tagged event variants a live session emits.
//!
//! These types describe the boundary between the engine and the opaque
//! messaging transport. The transport owns the wire format; the engine
//! only sees conversation addresses, message bodies, and opaque references
//! for quoting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::creds::Credentials;

/// The addressable destination/source of messages (a chat thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque reference to an inbound message, kept only so an outbound reply
/// can quote it. The `raw` payload is transport-defined and round-tripped
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRef {
    /// Transport-assigned message ID.
    pub id: String,

    /// Transport-defined raw message payload (for quote construction).
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// One inbound message event. Ephemeral: consumed by the router and
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Conversation the message arrived in.
    pub conversation_id: ConversationId,

    /// True when the message is an echo of this process's own send.
    pub sender_is_self: bool,

    /// Textual body, if the message carries one.
    pub body: Option<String>,

    /// Reference for quoted replies.
    pub reference: MessageRef,

    /// When the transport delivered the message.
    pub timestamp: DateTime<Utc>,
}

/// One outbound reply, consumed exactly once by the session's send
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundReply {
    /// Conversation the reply goes to (always the originating one).
    pub conversation_id: ConversationId,

    /// Reply text.
    pub text: String,

    /// Inbound message this reply quotes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted: Option<MessageRef>,
}

/// Why the transport closed the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Explicit user/device unlinking. Terminal: the session must not be
    /// recreated.
    LoggedOut,

    /// Network-level failure with a transport-supplied detail string.
    ConnectionLost { detail: String },

    /// The remote service restarted.
    ServerRestart,

    /// The server considers this session stale and replaced it.
    StaleSession,
}

impl DisconnectReason {
    /// Whether this closure forbids reconnecting.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisconnectReason::LoggedOut)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::LoggedOut => write!(f, "logged out"),
            DisconnectReason::ConnectionLost { detail } => {
                write!(f, "connection lost: {detail}")
            }
            DisconnectReason::ServerRestart => write!(f, "server restart"),
            DisconnectReason::StaleSession => write!(f, "stale session"),
        }
    }
}

/// Connection state as observed by the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed { reason: DisconnectReason },
}

/// Tagged event variants delivered by a live session.
///
/// Delivery is asynchronous; the supervisor consumes these strictly in
/// arrival order from a single channel.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The transport rotated or extended the credential blob.
    CredsUpdated(Credentials),

    /// Connection-state transition.
    ConnectionState(ConnectionState),

    /// An inbound message arrived.
    MessageReceived(InboundMessage),

    /// Scannable pairing token (QR-style flow), emitted while
    /// unregistered.
    PairingPayload(String),
}

/// Messaging-protocol version the session is created against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Session creation options: how this client identifies itself to the
/// remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    pub client_name: String,
    pub client_version: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            client_name: "wagenie".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
