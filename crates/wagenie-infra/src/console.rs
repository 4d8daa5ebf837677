//! Console transport: the full engine without a messaging network.
//!
//! Stdin lines become inbound messages on a single fixed conversation and
//! replies print to stdout. Pairing hands out a generated code and flips
//! the stored credentials to registered through a `CredsUpdated` event, so
//! the first-run flow can be exercised end to end. Stdin EOF closes the
//! session as a logout, which stops the supervisor instead of spinning on
//! an exhausted input.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use wagenie_core::session::{BoxSession, MessagingSession, SessionFactory};
use wagenie_types::creds::Credentials;
use wagenie_types::error::TransportError;
use wagenie_types::pairing::PairingCode;
use wagenie_types::session::{
    ConnectionState, ConversationId, DisconnectReason, InboundMessage, MessageRef, OutboundReply,
    ProtocolVersion, SessionEvent, SessionOptions,
};

/// The one conversation every stdin line belongs to.
pub const CONSOLE_CONVERSATION: &str = "console";

const EVENT_BUFFER: usize = 64;

/// Turn one stdin line into an inbound message.
fn inbound_from_line(line: String) -> InboundMessage {
    InboundMessage {
        conversation_id: ConversationId::new(CONSOLE_CONVERSATION),
        sender_is_self: false,
        body: Some(line),
        reference: MessageRef::new(Uuid::now_v7().to_string()),
        timestamp: chrono::Utc::now(),
    }
}

/// Session whose remote end is the local terminal.
pub struct ConsoleSession {
    registered: bool,
    events: mpsc::Sender<SessionEvent>,
}

impl MessagingSession for ConsoleSession {
    fn registered(&self) -> bool {
        self.registered
    }

    async fn send(&self, reply: OutboundReply) -> Result<(), TransportError> {
        println!("[{}] {}", reply.conversation_id, reply.text);
        Ok(())
    }

    async fn request_pairing_code(&self, identifier: &str) -> Result<PairingCode, TransportError> {
        debug!(identifier, "issuing console pairing code");
        let code: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect::<String>()
            .to_uppercase();

        // Registration succeeds immediately: report the rotated
        // credentials so they get persisted like a real transport's would.
        let creds = Credentials {
            registered: true,
            blob: serde_json::json!({ "transport": "console", "identifier": identifier }),
        };
        self.events
            .send(SessionEvent::CredsUpdated(creds))
            .await
            .map_err(|_| TransportError::Pairing("event channel closed".to_string()))?;

        Ok(PairingCode(code))
    }
}

/// Creates console sessions backed by a stdin reader task.
#[derive(Debug, Default)]
pub struct ConsoleSessionFactory;

impl ConsoleSessionFactory {
    pub fn new() -> Self {
        Self
    }
}

impl SessionFactory for ConsoleSessionFactory {
    async fn fetch_protocol_version(&self) -> Result<ProtocolVersion, TransportError> {
        Ok(ProtocolVersion::new(1, 0, 0))
    }

    async fn create(
        &self,
        creds: Credentials,
        _version: ProtocolVersion,
        options: SessionOptions,
    ) -> Result<(BoxSession, mpsc::Receiver<SessionEvent>), TransportError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        debug!(client = %options.client_name, "creating console session");

        let events = tx.clone();
        tokio::spawn(async move {
            let _ = events
                .send(SessionEvent::ConnectionState(ConnectionState::Open))
                .await;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if events
                    .send(SessionEvent::MessageReceived(inbound_from_line(line)))
                    .await
                    .is_err()
                {
                    return;
                }
            }

            let _ = events
                .send(SessionEvent::ConnectionState(ConnectionState::Closed {
                    reason: DisconnectReason::LoggedOut,
                }))
                .await;
        });

        let session = ConsoleSession {
            registered: creds.registered,
            events: tx,
        };
        Ok((BoxSession::new(session), rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_become_console_messages() {
        let message = inbound_from_line(".ai hello".to_string());
        assert_eq!(message.conversation_id.as_str(), CONSOLE_CONVERSATION);
        assert_eq!(message.body.as_deref(), Some(".ai hello"));
        assert!(!message.sender_is_self);
    }

    #[test]
    fn message_references_are_unique() {
        let a = inbound_from_line("one".to_string());
        let b = inbound_from_line("two".to_string());
        assert_ne!(a.reference.id, b.reference.id);
    }

    #[tokio::test]
    async fn pairing_reports_registered_credentials() {
        let (tx, mut rx) = mpsc::channel(4);
        let session = ConsoleSession {
            registered: false,
            events: tx,
        };

        let code = session.request_pairing_code("15551234567").await.unwrap();
        assert_eq!(code.0.len(), 8);

        match rx.recv().await {
            Some(SessionEvent::CredsUpdated(creds)) => {
                assert!(creds.registered);
                assert_eq!(creds.blob["transport"], "console");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_succeeds_without_a_remote() {
        let (tx, _rx) = mpsc::channel(4);
        let session = ConsoleSession {
            registered: true,
            events: tx,
        };
        let reply = OutboundReply {
            conversation_id: ConversationId::new(CONSOLE_CONVERSATION),
            text: "hello".to_string(),
            quoted: None,
        };
        session.send(reply).await.unwrap();
    }
}
