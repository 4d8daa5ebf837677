//! Per-conversation dispatch lanes.
//!
//! Each conversation gets a bounded mpsc lane served by one worker task,
//! so replies within a conversation stay ordered relative to their
//! triggering messages while distinct conversations run concurrently.
//! A pool lives exactly as long as one session generation: `shutdown`
//! drops the lane senders, drains the workers, and with them the last
//! clones of the session handle.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use wagenie_types::session::{ConversationId, InboundMessage};

use crate::router::CommandRouter;
use crate::session::BoxSession;

/// Buffer size for per-conversation lanes. Overflow drops the message:
/// a best-effort bot prefers losing a command to unbounded memory growth.
const LANE_BUFFER: usize = 64;

/// Fans inbound messages out to per-conversation worker tasks.
pub struct DispatchPool {
    router: Arc<CommandRouter>,
    session: Arc<BoxSession>,
    lanes: HashMap<ConversationId, mpsc::Sender<InboundMessage>>,
    workers: JoinSet<()>,
}

impl DispatchPool {
    pub fn new(router: Arc<CommandRouter>, session: Arc<BoxSession>) -> Self {
        Self {
            router,
            session,
            lanes: HashMap::new(),
            workers: JoinSet::new(),
        }
    }

    /// Queue one message on its conversation's lane, spawning the lane
    /// worker on first use.
    pub fn dispatch(&mut self, message: InboundMessage) {
        let conversation = message.conversation_id.clone();
        let sender = self.lanes.entry(conversation).or_insert_with_key(|id| {
            let (tx, mut rx) = mpsc::channel::<InboundMessage>(LANE_BUFFER);
            let router = Arc::clone(&self.router);
            let session = Arc::clone(&self.session);
            let lane = id.clone();
            self.workers.spawn(async move {
                while let Some(message) = rx.recv().await {
                    router.on_message(&session, message).await;
                }
                debug!(conversation = %lane, "dispatch lane drained");
            });
            tx
        });

        match sender.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    conversation = %dropped.conversation_id,
                    "dispatch lane full, dropping message"
                );
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(
                    conversation = %dropped.conversation_id,
                    "dispatch lane closed, dropping message"
                );
            }
        }
    }

    /// Number of conversations with an active lane.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Drop all lane senders and wait for every worker to finish its
    /// queued messages. After this returns, no task holds the session.
    pub async fn shutdown(mut self) {
        self.lanes.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

impl std::fmt::Debug for DispatchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("lanes", &self.lanes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{BoxCommandHandler, CommandHandler};
    use crate::testkit::{MockSession, text_message};
    use std::sync::Mutex;
    use std::time::Duration;
    use wagenie_types::error::GenerationError;

    /// Sleeps when the argument starts with "slow", so a later "fast"
    /// message can overtake it if ordering is broken.
    struct VariableLatency;

    impl CommandHandler for VariableLatency {
        async fn handle(&self, argument: &str) -> Result<String, GenerationError> {
            if argument.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(argument.to_string())
        }
    }

    fn pool_with_session() -> (DispatchPool, Arc<Mutex<Vec<wagenie_types::session::OutboundReply>>>)
    {
        let mut router = CommandRouter::new();
        router.register(".ai", BoxCommandHandler::new(VariableLatency));
        let mock = MockSession::registered_session();
        let sent = mock.sent.clone();
        let pool = DispatchPool::new(Arc::new(router), Arc::new(BoxSession::new(mock)));
        (pool, sent)
    }

    #[tokio::test]
    async fn replies_stay_ordered_within_a_conversation() {
        let (mut pool, sent) = pool_with_session();

        pool.dispatch(text_message("conv-1", ".ai slow first"));
        pool.dispatch(text_message("conv-1", ".ai fast second"));
        pool.shutdown().await;

        let sent = sent.lock().unwrap();
        let texts: Vec<_> = sent.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["slow first", "fast second"]);
    }

    #[tokio::test]
    async fn distinct_conversations_both_get_replies() {
        let (mut pool, sent) = pool_with_session();

        pool.dispatch(text_message("conv-a", ".ai slow from-a"));
        pool.dispatch(text_message("conv-b", ".ai from-b"));
        assert_eq!(pool.lane_count(), 2);
        pool.shutdown().await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let mut conversations: Vec<_> =
            sent.iter().map(|r| r.conversation_id.as_str()).collect();
        conversations.sort_unstable();
        assert_eq!(conversations, vec!["conv-a", "conv-b"]);
    }

    #[tokio::test]
    async fn shutdown_with_no_traffic_completes() {
        let (pool, sent) = pool_with_session();
        pool.shutdown().await;
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_lane_per_conversation() {
        let (mut pool, _) = pool_with_session();
        pool.dispatch(text_message("conv-a", ".ai one"));
        pool.dispatch(text_message("conv-a", ".ai two"));
        assert_eq!(pool.lane_count(), 1);
        pool.shutdown().await;
    }
}
