//! Command router: one inbound message to at most one handler.
//!
//! Filtering rules, checked in order: a message with no textual body is
//! dropped; a message echoed from this process (`sender_is_self`) is
//! dropped, which is the guard that prevents a reply matching a command
//! prefix from looping forever. Command extraction is a literal,
//! case-sensitive longest-prefix match where the prefix must be followed
//! by a single separating space; everything after that space is the
//! argument, untrimmed. Unrecognized prefixes are silently ignored --
//! this is a best-effort bot, not a strict command shell.

pub mod dispatch;

pub use dispatch::DispatchPool;

use tracing::{debug, warn};

use wagenie_types::session::{InboundMessage, OutboundReply};

use crate::generation::BoxCommandHandler;
use crate::session::BoxSession;

/// Fixed reply sent when a handler fails. Nothing more specific ever
/// reaches the remote conversation.
pub const FAILURE_REPLY: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Table of `prefix -> handler`, resolved by longest prefix with a
/// trailing space.
pub struct CommandRouter {
    /// Kept sorted by descending prefix length so the first hit wins.
    commands: Vec<(String, BoxCommandHandler)>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a handler for a literal prefix. A later registration of
    /// the same prefix replaces the earlier one (exactly one handler per
    /// prefix).
    pub fn register(&mut self, prefix: impl Into<String>, handler: BoxCommandHandler) {
        let prefix = prefix.into();
        self.commands.retain(|(p, _)| *p != prefix);
        self.commands.push((prefix, handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Number of registered prefixes.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Resolve a body to `(table index, argument)`, or `None` when no
    /// registered prefix matches.
    fn resolve<'a>(&self, body: &'a str) -> Option<(usize, &'a str)> {
        self.commands.iter().enumerate().find_map(|(idx, (prefix, _))| {
            body.strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
                .map(|argument| (idx, argument))
        })
    }

    /// Process one inbound message end to end: filter, resolve, run the
    /// handler, send the (quoted) reply.
    ///
    /// Never returns an error: generation failures become the fixed
    /// failure reply, and transport failures are logged. Nothing here can
    /// crash the session.
    pub async fn on_message(&self, session: &BoxSession, message: InboundMessage) {
        let Some(body) = message.body.as_deref() else {
            return;
        };
        if message.sender_is_self {
            debug!(conversation = %message.conversation_id, "ignoring own echo");
            return;
        }
        let Some((idx, argument)) = self.resolve(body) else {
            return;
        };
        let (prefix, handler) = &self.commands[idx];

        debug!(
            conversation = %message.conversation_id,
            command = %prefix,
            "dispatching command"
        );

        let text = match handler.handle(argument).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    conversation = %message.conversation_id,
                    command = %prefix,
                    error = %e,
                    "command handler failed"
                );
                FAILURE_REPLY.to_string()
            }
        };

        let reply = OutboundReply {
            conversation_id: message.conversation_id.clone(),
            text,
            quoted: Some(message.reference.clone()),
        };

        if let Err(e) = session.send(reply).await {
            warn!(
                conversation = %message.conversation_id,
                error = %e,
                "failed to send reply"
            );
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field(
                "prefixes",
                &self.commands.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}
