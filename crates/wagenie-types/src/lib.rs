//! Shared domain types for Wagenie.
//!
//! This crate contains the types used across the Wagenie bot engine:
//! credentials, session events, pairing, configuration, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod creds;
pub mod error;
pub mod pairing;
pub mod session;
