use thiserror::Error;

/// Errors from the messaging transport layer.
///
/// Never fatal to the process: the supervisor treats them as transient
/// and drives the reconnect path.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("pairing request failed: {0}")]
    Pairing(String),

    #[error("protocol version fetch failed: {0}")]
    Version(String),
}

/// Errors surfaced to the pairing presentation layer. Not retried
/// automatically.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("session is already registered")]
    AlreadyRegistered,

    #[error("invalid pairing identifier: {0}")]
    IdentifierInvalid(String),

    #[error("pairing transport failure: {0}")]
    Transport(String),
}

/// Errors from the credential store.
///
/// Fatal on initial load (the process cannot proceed without knowing its
/// registration state); non-fatal on save.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persisted credentials are corrupt: {0}")]
    Corrupt(String),
}

/// Errors from the generation backends.
///
/// Fully recovered by the command router: the end user sees a fixed
/// failure reply, never the error itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("generation quota exceeded")]
    QuotaExceeded,

    #[error("prompt rejected by backend: {0}")]
    InvalidPrompt(String),
}
