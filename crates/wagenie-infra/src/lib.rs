//! Infrastructure adapters for Wagenie.
//!
//! Implements the ports declared in `wagenie-core`: the on-disk credential
//! store, the OpenAI-backed generation services, and a console transport
//! for running the engine without a real messaging network.

pub mod console;
pub mod credstore;
pub mod openai;
pub mod secret;
