//! `wagenie run` -- assemble the engine and drive it until logout,
//! shutdown, or a fatal error.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::info;

use wagenie_core::generation::{BoxCommandHandler, ImageGenerationHandler, TextCompletionHandler};
use wagenie_core::pairing::PairingController;
use wagenie_core::router::CommandRouter;
use wagenie_core::supervisor::{ConnectionSupervisor, ReconnectPolicy, SupervisorExit};
use wagenie_infra::console::ConsoleSessionFactory;
use wagenie_infra::openai::{OpenAiCompletionService, OpenAiImageService};
use wagenie_infra::secret::{api_key_from_env, ENV_API_KEY, ENV_API_KEY_FALLBACK};
use wagenie_types::config::{BotConfig, CommandAction};
use wagenie_types::pairing::PairingDisplay;
use wagenie_types::session::SessionOptions;

use crate::http;
use crate::state::AppState;

/// Bind the configured command table to its generation backends. Each
/// service gets its own copy of the key.
fn build_command_router(config: &BotConfig, api_key: &SecretString) -> CommandRouter {
    let mut router = CommandRouter::new();
    for binding in &config.commands {
        let secret = SecretString::from(api_key.expose_secret().to_string());
        let handler = match binding.action {
            CommandAction::Completion => BoxCommandHandler::new(TextCompletionHandler::new(
                OpenAiCompletionService::new(secret, &config.completion),
            )),
            CommandAction::Image => BoxCommandHandler::new(ImageGenerationHandler::new(
                OpenAiImageService::new(secret, &config.image),
            )),
        };
        router.register(binding.prefix.clone(), handler);
    }
    router
}

fn render_pairing(display: &PairingDisplay, json: bool) {
    if json {
        if let Ok(encoded) = serde_json::to_string(display) {
            println!("{encoded}");
        }
        return;
    }
    match display {
        PairingDisplay::Code { code } => {
            println!();
            println!(
                "  {} enter this code under Linked Devices: {}",
                style("pair").cyan().bold(),
                style(code).green().bold()
            );
            println!();
        }
        PairingDisplay::AwaitingQr => {
            println!("  {} waiting for a scannable code...", style("pair").cyan());
        }
        PairingDisplay::QrPayload { payload } => {
            println!("  {} scan to link: {payload}", style("pair").cyan().bold());
        }
        PairingDisplay::Failed { detail } => {
            eprintln!("  {} pairing failed: {detail}", style("error").red().bold());
        }
    }
}

/// Print pairing material as it becomes available.
fn spawn_pairing_printer(mut rx: watch::Receiver<Option<PairingDisplay>>, json: bool) {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let display = rx.borrow_and_update().clone();
            if let Some(display) = display {
                render_pairing(&display, json);
            }
        }
    });
}

pub async fn run_bot(
    state: &AppState,
    pairing_http: Option<SocketAddr>,
    json: bool,
) -> anyhow::Result<()> {
    let pairing_mode = state.config.pairing().context(
        "code pairing is selected but no phone_number is configured; \
         set phone_number in config.toml or switch pairing_mode to \"qr\"",
    )?;

    let api_key = api_key_from_env().with_context(|| {
        format!("no OpenAI API key found; set {ENV_API_KEY} or {ENV_API_KEY_FALLBACK}")
    })?;

    let router = build_command_router(&state.config, &api_key);
    info!(
        commands = router.command_count(),
        data_dir = %state.data_dir.display(),
        "starting bot"
    );

    let supervisor = ConnectionSupervisor::new(
        ConsoleSessionFactory::new(),
        state.store.clone(),
        Arc::new(router),
        PairingController::new(pairing_mode),
        ReconnectPolicy::from_config(&state.config.reconnect),
        SessionOptions::default(),
    );

    let cancel = supervisor.cancellation_token();
    spawn_pairing_printer(supervisor.pairing_watch(), json);

    if let Some(addr) = pairing_http {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding pairing surface to {addr}"))?;
        info!(%addr, "pairing surface listening");
        let app = http::build_router(supervisor.pairing_watch(), supervisor.state_watch());
        let shutdown = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "pairing surface failed");
            }
        });
    }

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_cancel.cancel();
    });

    match supervisor.run().await? {
        SupervisorExit::LoggedOut => {
            if !json {
                println!(
                    "  {} device was unlinked; run `wagenie creds reset` to pair again",
                    style("logged out").yellow().bold()
                );
            }
        }
        SupervisorExit::Shutdown => info!("stopped"),
    }
    // The HTTP task exits with the cancelled token.
    cancel.cancel();
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
