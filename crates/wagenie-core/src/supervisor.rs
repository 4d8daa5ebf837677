//! Connection supervisor: owns the session, observes its events, and
//! decides reconnect vs. halt.
//!
//! The state machine is `Idle -> Connecting -> Open -> Closed` where a
//! closure is terminal only on explicit logout. Transient closures
//! re-enter session creation after bounded exponential backoff, with a
//! maximum-attempt circuit breaker instead of the busy-loop a naive
//! immediate retry would produce. Closure handling is strictly
//! sequential: the previous session handle is fully released (dispatch
//! workers joined, last `Arc` dropped) before a new `Connecting` begins.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wagenie_types::config::ReconnectConfig;
use wagenie_types::error::CredentialError;
use wagenie_types::pairing::PairingDisplay;
use wagenie_types::session::{ConnectionState, DisconnectReason, SessionEvent, SessionOptions};

use crate::credstore::CredentialStore;
use crate::pairing::PairingController;
use crate::router::{CommandRouter, DispatchPool};
use crate::session::SessionFactory;

/// Supervisor state, tracked for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Connecting,
    Open,
    ClosedTransient,
    ClosedTerminal,
}

/// How a supervisor run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Terminal closure: the device was unlinked. The session must not be
    /// recreated.
    LoggedOut,

    /// The cancellation token was triggered.
    Shutdown,
}

/// Fatal supervisor failures.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The initial credential load failed; without it the registration
    /// state is unknown and the process cannot safely proceed.
    #[error("credential load failed: {0}")]
    Credential(#[from] CredentialError),

    /// Circuit breaker: too many consecutive failed connection cycles.
    #[error("gave up reconnecting after {attempts} failed attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Bounded exponential backoff between reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.max_attempts,
        )
    }

    /// Delay before the given attempt (1-based): base * 2^(attempt-1),
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// How one session generation's event loop ended.
enum LoopEnd {
    /// Cancellation token fired.
    Shutdown,
    /// Connection closed; `None` means the event channel closed without a
    /// reason, treated as a transient loss.
    Closed(Option<DisconnectReason>),
}

/// Owns the single active session and drives the
/// connect/pair/dispatch/reconnect cycle.
pub struct ConnectionSupervisor<F, S> {
    factory: F,
    store: S,
    router: Arc<CommandRouter>,
    pairing: PairingController,
    policy: ReconnectPolicy,
    options: SessionOptions,
    pairing_tx: watch::Sender<Option<PairingDisplay>>,
    state_tx: watch::Sender<SupervisorState>,
    cancel: CancellationToken,
}

impl<F, S> ConnectionSupervisor<F, S>
where
    F: SessionFactory,
    S: CredentialStore,
{
    pub fn new(
        factory: F,
        store: S,
        router: Arc<CommandRouter>,
        pairing: PairingController,
        policy: ReconnectPolicy,
        options: SessionOptions,
    ) -> Self {
        let (pairing_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(SupervisorState::Idle);
        Self {
            factory,
            store,
            router,
            pairing,
            policy,
            options,
            pairing_tx,
            state_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Watch the pairing material the presentation surface should render.
    pub fn pairing_watch(&self) -> watch::Receiver<Option<PairingDisplay>> {
        self.pairing_tx.subscribe()
    }

    /// Watch the supervisor's lifecycle state.
    pub fn state_watch(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: SupervisorState) {
        let _ = self.state_tx.send(state);
    }

    /// Token that stops the supervisor cleanly when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until terminal closure, cancellation, or a fatal error.
    pub async fn run(self) -> Result<SupervisorExit, SupervisorError> {
        let mut attempts: u32 = 0;
        let mut initial_load = true;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(SupervisorExit::Shutdown);
            }

            self.set_state(SupervisorState::Connecting);
            info!("connecting");

            let creds = match self.store.load().await {
                Ok(creds) => creds,
                Err(e) if initial_load => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "credential reload failed");
                    self.backoff(&mut attempts).await?;
                    continue;
                }
            };
            initial_load = false;

            let version = match self.factory.fetch_protocol_version().await {
                Ok(version) => version,
                Err(e) => {
                    warn!(error = %e, "protocol version fetch failed");
                    self.backoff(&mut attempts).await?;
                    continue;
                }
            };

            let (session, mut events) = match self
                .factory
                .create(creds.clone(), version, self.options.clone())
                .await
            {
                Ok(created) => created,
                Err(e) => {
                    warn!(error = %e, "session creation failed");
                    self.backoff(&mut attempts).await?;
                    continue;
                }
            };
            let session = Arc::new(session);
            info!(%version, registered = creds.registered, "session created");

            // Exactly one pairing request per creation cycle, and only
            // while unregistered. Failures go to the presentation surface;
            // the session's own closure drives the next cycle.
            if !creds.registered {
                match self.pairing.request(&session).await {
                    Ok(display) => {
                        let _ = self.pairing_tx.send(Some(display));
                    }
                    Err(e) => {
                        warn!(error = %e, "pairing request failed");
                        let _ = self.pairing_tx.send(Some(PairingDisplay::Failed {
                            detail: e.to_string(),
                        }));
                    }
                }
            }

            let mut pool = DispatchPool::new(Arc::clone(&self.router), Arc::clone(&session));
            let mut open = false;

            let end = loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => break LoopEnd::Shutdown,
                    event = events.recv() => match event {
                        None => break LoopEnd::Closed(None),
                        Some(SessionEvent::CredsUpdated(updated)) => {
                            if let Err(e) = self.store.save(&updated).await {
                                // Non-fatal: retried on the next update.
                                warn!(error = %e, "credential save failed");
                            }
                        }
                        Some(SessionEvent::ConnectionState(ConnectionState::Connecting)) => {
                            debug!("transport reports connecting");
                        }
                        Some(SessionEvent::ConnectionState(ConnectionState::Open)) => {
                            open = true;
                            attempts = 0;
                            self.set_state(SupervisorState::Open);
                            info!("session open");
                        }
                        Some(SessionEvent::ConnectionState(ConnectionState::Closed { reason })) => {
                            break LoopEnd::Closed(Some(reason));
                        }
                        Some(SessionEvent::MessageReceived(message)) => {
                            if open {
                                pool.dispatch(message);
                            } else {
                                debug!(
                                    conversation = %message.conversation_id,
                                    "message before open, dropped"
                                );
                            }
                        }
                        Some(SessionEvent::PairingPayload(payload)) => {
                            let _ = self.pairing_tx.send(
                                Some(PairingDisplay::QrPayload { payload }),
                            );
                        }
                    }
                }
            };

            // Drain in-flight handlers and release the session before any
            // reconnect decision; concurrent reconnects are forbidden.
            pool.shutdown().await;
            drop(session);

            match end {
                LoopEnd::Shutdown => {
                    self.set_state(SupervisorState::Idle);
                    info!("supervisor cancelled");
                    return Ok(SupervisorExit::Shutdown);
                }
                LoopEnd::Closed(Some(reason)) if reason.is_terminal() => {
                    self.set_state(SupervisorState::ClosedTerminal);
                    info!(%reason, "terminal closure, halting");
                    return Ok(SupervisorExit::LoggedOut);
                }
                LoopEnd::Closed(reason) => {
                    self.set_state(SupervisorState::ClosedTransient);
                    match reason {
                        Some(reason) => warn!(%reason, "transient closure, reconnecting"),
                        None => warn!("event stream ended, reconnecting"),
                    }
                    self.backoff(&mut attempts).await?;
                }
            }
        }
    }

    /// Sleep before the next attempt, or trip the circuit breaker.
    async fn backoff(&self, attempts: &mut u32) -> Result<(), SupervisorError> {
        *attempts += 1;
        if *attempts > self.policy.max_attempts {
            return Err(SupervisorError::RetriesExhausted {
                attempts: *attempts,
            });
        }
        let delay = self.policy.delay_for(*attempts);
        debug!(attempt = *attempts, ?delay, "backing off before reconnect");
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
        Ok(())
    }
}
