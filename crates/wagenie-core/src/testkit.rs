//! In-process test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;

use wagenie_types::creds::Credentials;
use wagenie_types::error::{CredentialError, TransportError};
use wagenie_types::pairing::PairingCode;
use wagenie_types::session::{
    ConversationId, InboundMessage, MessageRef, OutboundReply, ProtocolVersion, SessionEvent,
    SessionOptions,
};

use crate::credstore::CredentialStore;
use crate::session::{BoxSession, MessagingSession, SessionFactory};

/// Recording session double: captures sends and counts pairing requests.
pub(crate) struct MockSession {
    pub registered: bool,
    pub fail_sends: bool,
    pub pairing_code: String,
    pub pairing_requests: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<OutboundReply>>>,
}

impl MockSession {
    pub fn registered_session() -> Self {
        Self {
            registered: true,
            fail_sends: false,
            pairing_code: String::new(),
            pairing_requests: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unregistered_session(pairing_code: &str) -> Self {
        Self {
            registered: false,
            fail_sends: false,
            pairing_code: pairing_code.to_string(),
            pairing_requests: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MessagingSession for MockSession {
    fn registered(&self) -> bool {
        self.registered
    }

    async fn send(&self, reply: OutboundReply) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Send("mock send failure".to_string()));
        }
        self.sent.lock().unwrap().push(reply);
        Ok(())
    }

    async fn request_pairing_code(&self, _identifier: &str) -> Result<PairingCode, TransportError> {
        self.pairing_requests.fetch_add(1, Ordering::SeqCst);
        Ok(PairingCode(self.pairing_code.clone()))
    }
}

/// In-memory credential store counting saves. Handles are shared so tests
/// can keep inspecting state after the store is moved into a supervisor.
pub(crate) struct MemoryCredentialStore {
    pub creds: Arc<Mutex<Credentials>>,
    pub saves: Arc<AtomicUsize>,
}

impl MemoryCredentialStore {
    pub fn new(creds: Credentials) -> Self {
        Self {
            creds: Arc::new(Mutex::new(creds)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Credentials, CredentialError> {
        Ok(self.creds.lock().unwrap().clone())
    }

    async fn save(&self, creds: &Credentials) -> Result<(), CredentialError> {
        *self.creds.lock().unwrap() = creds.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory that hands out pre-scripted sessions in order and fails with a
/// transport error once the script runs dry.
pub(crate) struct ScriptedFactory {
    sessions: Mutex<VecDeque<(BoxSession, mpsc::Receiver<SessionEvent>)>>,
    pub creates: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(sessions: Vec<(BoxSession, mpsc::Receiver<SessionEvent>)>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SessionFactory for ScriptedFactory {
    async fn fetch_protocol_version(&self) -> Result<ProtocolVersion, TransportError> {
        Ok(ProtocolVersion::new(1, 0, 0))
    }

    async fn create(
        &self,
        _creds: Credentials,
        _version: ProtocolVersion,
        _options: SessionOptions,
    ) -> Result<(BoxSession, mpsc::Receiver<SessionEvent>), TransportError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.sessions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Connection("session script exhausted".to_string()))
    }
}

/// Build a scripted session whose event channel delivers `events` and then
/// closes.
pub(crate) fn scripted_session(
    session: MockSession,
    events: Vec<SessionEvent>,
) -> (BoxSession, mpsc::Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel(events.len().max(1));
    for event in events {
        tx.try_send(event).expect("event buffer sized to script");
    }
    (BoxSession::new(session), rx)
}

/// Inbound message with a textual body, not from self.
pub(crate) fn text_message(conversation: &str, body: &str) -> InboundMessage {
    InboundMessage {
        conversation_id: ConversationId::from(conversation),
        sender_is_self: false,
        body: Some(body.to_string()),
        reference: MessageRef::new(format!("msg-{body:.8}")),
        timestamp: Utc::now(),
    }
}
