//! Credential store port.
//!
//! The store is the single source of truth for the `registered` flag. It
//! persists whatever blob the live session last emitted; the engine never
//! constructs credentials by hand beyond the first-run empty value.

use wagenie_types::creds::Credentials;
use wagenie_types::error::CredentialError;

/// Durable load/save of the session's authentication material.
///
/// Contract:
/// - `load` returns `Credentials::empty()` when nothing is persisted yet
///   (first-run pairing depends on this). A real I/O failure is an error,
///   and fatal at initial load.
/// - `save` is idempotent: persisting content identical to what is already
///   stored is observable to callers as a plain success. The write must be
///   atomic with respect to a process crash.
pub trait CredentialStore: Send + Sync {
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Credentials, CredentialError>> + Send;

    fn save(
        &self,
        creds: &Credentials,
    ) -> impl std::future::Future<Output = Result<(), CredentialError>> + Send;
}
