//! Pairing/health HTTP surface.
//!
//! Optional and read-only: a small axum app exposing the current pairing
//! display and a liveness probe, so a headless deployment can fetch its
//! pairing code without terminal access.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use wagenie_core::supervisor::SupervisorState;
use wagenie_types::pairing::PairingDisplay;

type PairingWatch = watch::Receiver<Option<PairingDisplay>>;
type StateWatch = watch::Receiver<SupervisorState>;

#[derive(Clone)]
struct HttpState {
    pairing: PairingWatch,
    supervisor: StateWatch,
}

/// Build the surface around the supervisor's watch channels.
pub fn build_router(pairing: PairingWatch, supervisor: StateWatch) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/pairing", get(current_pairing))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(HttpState {
            pairing,
            supervisor,
        })
}

/// GET /healthz - liveness probe with the connection lifecycle state.
async fn healthz(State(state): State<HttpState>) -> Json<serde_json::Value> {
    let connection = format!("{:?}", *state.supervisor.borrow());
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connection": connection,
    }))
}

/// GET /pairing - the pairing material the operator should act on, `null`
/// until the supervisor publishes one.
async fn current_pairing(State(state): State<HttpState>) -> Json<Option<PairingDisplay>> {
    Json(state.pairing.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagenie_types::pairing::PairingCode;

    fn test_state() -> (watch::Sender<Option<PairingDisplay>>, HttpState) {
        let (pairing_tx, pairing) = watch::channel(None);
        let (_state_tx, supervisor) = watch::channel(SupervisorState::Open);
        (
            pairing_tx,
            HttpState {
                pairing,
                supervisor,
            },
        )
    }

    #[tokio::test]
    async fn healthz_reports_ok_and_connection_state() {
        let (_tx, state) = test_state();
        let Json(body) = healthz(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connection"], "Open");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn pairing_endpoint_tracks_the_watch_channel() {
        let (tx, state) = test_state();

        let Json(body) = current_pairing(State(state.clone())).await;
        assert!(body.is_none());

        tx.send(Some(PairingDisplay::Code {
            code: PairingCode("WX12YZ34".to_string()),
        }))
        .unwrap();
        let Json(body) = current_pairing(State(state)).await;
        assert_eq!(
            body,
            Some(PairingDisplay::Code {
                code: PairingCode("WX12YZ34".to_string())
            })
        );
    }

    #[test]
    fn router_builds() {
        let (_ptx, pairing) = watch::channel(None);
        let (_stx, supervisor) = watch::channel(SupervisorState::Idle);
        let _ = build_router(pairing, supervisor);
    }
}
