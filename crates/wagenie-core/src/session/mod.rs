//! Session capability traits.
//!
//! The messaging transport (handshake, encryption, wire framing) is an
//! external collaborator. The engine sees it only through these two
//! traits: `SessionFactory` creates a live session from credentials and a
//! protocol version, and `MessagingSession` is the narrow capability the
//! rest of the engine is allowed to hold -- send a reply, request a
//! pairing code, nothing else.
//!
//! Uses native async fn in traits (RPITIT) like the generation-service
//! ports; `BoxSession` provides the object-safe wrapper.

pub mod box_session;

pub use box_session::BoxSession;

use tokio::sync::mpsc;

use wagenie_types::creds::Credentials;
use wagenie_types::error::TransportError;
use wagenie_types::pairing::PairingCode;
use wagenie_types::session::{OutboundReply, ProtocolVersion, SessionEvent, SessionOptions};

/// The live, authenticated connection handle to the messaging service.
///
/// Exactly one instance is active per process at any instant; the
/// supervisor owns it and hands it to dispatch workers only as a
/// send capability.
pub trait MessagingSession: Send + Sync {
    /// Whether the credentials this session was created from are paired
    /// with a messaging account.
    fn registered(&self) -> bool;

    /// Send one outbound reply into a conversation. Suspends until the
    /// network write completes.
    fn send(
        &self,
        reply: OutboundReply,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Request a typed pairing code bound to a phone-number identifier.
    ///
    /// Only meaningful while unregistered; the transport rejects the call
    /// otherwise.
    fn request_pairing_code(
        &self,
        identifier: &str,
    ) -> impl std::future::Future<Output = Result<PairingCode, TransportError>> + Send;
}

/// Creates sessions for the supervisor.
///
/// The factory is also responsible for knowing the current protocol
/// version, since the remote service rejects stale clients.
pub trait SessionFactory: Send + Sync {
    /// Fetch the protocol version new sessions should be created against.
    fn fetch_protocol_version(
        &self,
    ) -> impl std::future::Future<Output = Result<ProtocolVersion, TransportError>> + Send;

    /// Create a new session from the given credentials.
    ///
    /// Returns the session handle plus the receiving end of its event
    /// stream. Dropping the handle (and the receiver) releases the
    /// connection.
    fn create(
        &self,
        creds: Credentials,
        version: ProtocolVersion,
        options: SessionOptions,
    ) -> impl std::future::Future<
        Output = Result<(BoxSession, mpsc::Receiver<SessionEvent>), TransportError>,
    > + Send;
}
