//! Session lifecycle and dispatch engine for Wagenie.
//!
//! This crate defines the "ports" (session, credential store, generation
//! services) that the infrastructure layer implements, plus the engine
//! built on top of them: the connection supervisor, the pairing
//! controller, and the command router. It depends only on
//! `wagenie-types` -- never on `wagenie-infra` or any HTTP/IO crate.

pub mod credstore;
pub mod generation;
pub mod pairing;
pub mod router;
pub mod session;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testkit;
