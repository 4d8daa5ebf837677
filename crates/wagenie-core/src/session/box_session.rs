//! BoxSession -- object-safe dynamic dispatch wrapper for MessagingSession.
//!
//! Same blanket-impl pattern as `BoxCommandHandler`:
//! 1. Define an object-safe `MessagingSessionDyn` trait with boxed futures
//! 2. Blanket-impl `MessagingSessionDyn` for all `T: MessagingSession`
//! 3. `BoxSession` wraps `Box<dyn MessagingSessionDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use wagenie_types::error::TransportError;
use wagenie_types::pairing::PairingCode;
use wagenie_types::session::OutboundReply;

use super::MessagingSession;

/// Object-safe version of [`MessagingSession`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation is
/// provided for all types implementing `MessagingSession`.
pub trait MessagingSessionDyn: Send + Sync {
    fn registered(&self) -> bool;

    fn send_boxed<'a>(
        &'a self,
        reply: OutboundReply,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

    fn request_pairing_code_boxed<'a>(
        &'a self,
        identifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PairingCode, TransportError>> + Send + 'a>>;
}

impl<T: MessagingSession> MessagingSessionDyn for T {
    fn registered(&self) -> bool {
        MessagingSession::registered(self)
    }

    fn send_boxed<'a>(
        &'a self,
        reply: OutboundReply,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(self.send(reply))
    }

    fn request_pairing_code_boxed<'a>(
        &'a self,
        identifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PairingCode, TransportError>> + Send + 'a>> {
        Box::pin(self.request_pairing_code(identifier))
    }
}

/// Type-erased session handle.
///
/// Since `MessagingSession` uses RPITIT it cannot be a trait object
/// directly; `BoxSession` provides equivalent methods delegating to the
/// inner `MessagingSessionDyn` object. This is the concrete type the
/// supervisor owns and the dispatch workers borrow.
pub struct BoxSession {
    inner: Box<dyn MessagingSessionDyn + Send + Sync>,
}

impl BoxSession {
    /// Wrap a concrete session in a type-erased box.
    pub fn new<T: MessagingSession + 'static>(session: T) -> Self {
        Self {
            inner: Box::new(session),
        }
    }

    /// Whether the underlying credentials are registered.
    pub fn registered(&self) -> bool {
        self.inner.registered()
    }

    /// Send one outbound reply into a conversation.
    pub async fn send(&self, reply: OutboundReply) -> Result<(), TransportError> {
        self.inner.send_boxed(reply).await
    }

    /// Request a typed pairing code for the given identifier.
    pub async fn request_pairing_code(
        &self,
        identifier: &str,
    ) -> Result<PairingCode, TransportError> {
        self.inner.request_pairing_code_boxed(identifier).await
    }
}

impl std::fmt::Debug for BoxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSession")
            .field("registered", &self.inner.registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MockSession;
    use wagenie_types::session::ConversationId;

    #[tokio::test]
    async fn box_session_delegates_to_inner() {
        let mock = MockSession::registered_session();
        let sent = mock.sent.clone();
        let session = BoxSession::new(mock);

        assert!(session.registered());

        session
            .send(OutboundReply {
                conversation_id: ConversationId::from("conv-1"),
                text: "hi".to_string(),
                quoted: None,
            })
            .await
            .unwrap();

        let recorded = sent.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].text, "hi");
    }

    #[tokio::test]
    async fn box_session_pairing_delegation() {
        let mock = MockSession::unregistered_session("AB12CD34");
        let counter = mock.pairing_requests.clone();
        let session = BoxSession::new(mock);

        let code = session.request_pairing_code("15551234567").await.unwrap();
        assert_eq!(code.0, "AB12CD34");
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
