//! Daemon wiring: build the fleet, serve, wait for signals, drain.

use std::sync::Arc;

use botfleet_api::{serve, ApiConfig, AppState};
use botfleet_cipher::{CipherError, TokenCipher};
use botfleet_core::Settings;
use botfleet_registry::{RegistryError, SupabaseRegistry};
use botfleet_runtime::{FleetRuntime, RuntimeConfig, RuntimeError};
use botfleet_telegram::{OpenAiResponder, TelegramConnector};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::signals::{Signal, Signals};

/// Errors that end the daemon with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Encryption setup failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Row store client could not be built.
    #[error("row store: {0}")]
    Registry(#[from] RegistryError),

    /// Runtime lifecycle error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signals(#[from] std::io::Error),
}

/// Run the daemon until SIGINT or SIGTERM.
pub async fn run(cli: &Cli, settings: Settings) -> Result<(), AppError> {
    for warning in settings.warnings() {
        warn!("{}", warning);
    }

    let cipher = Arc::new(TokenCipher::telegram(
        settings.encryption_secret.as_deref(),
        settings.environment,
    )?);
    let registry = Arc::new(SupabaseRegistry::new(
        &settings.row_store_url,
        settings.row_store_key.clone(),
        settings.bots_table.clone(),
    )?);
    let responder = Arc::new(OpenAiResponder::new(
        settings.openai_api_key.clone(),
        settings.openai_model.clone(),
    ));
    let connector = Arc::new(TelegramConnector::new(responder));

    let config = RuntimeConfig::new()
        .with_refresh_interval(settings.refresh_interval)
        .with_shutdown_timeout(settings.shutdown_timeout);
    let mut runtime = FleetRuntime::new(config, cipher, connector, registry);

    // Installed before the first pass so an early Ctrl+C is not lost.
    let mut signals = Signals::new()?;

    info!(
        environment = %settings.environment,
        table = %settings.bots_table,
        refresh_secs = settings.refresh_interval.as_secs(),
        "starting botfleet"
    );
    runtime.start().await?;

    let (api_shutdown, api) = if cli.no_api {
        (None, None)
    } else {
        let (tx, task) = spawn_api(&settings, &runtime);
        (Some(tx), Some(task))
    };

    loop {
        match signals.recv().await {
            Signal::Refresh => {
                info!("SIGHUP received, refreshing bots");
                if let Err(e) = runtime.refresh_now() {
                    warn!(error = %e, "could not trigger refresh");
                }
            }
            Signal::Shutdown(signal) => {
                info!(signal, "shutdown requested");
                break;
            }
        }
    }

    if let Some(tx) = api_shutdown {
        let _ = tx.send(());
    }

    let stopped = runtime.shutdown().await?;

    if let Some(task) = api {
        if let Err(e) = task.await {
            warn!(error = %e, "API task ended abnormally");
        }
    }

    info!(stopped, "botfleet stopped");
    Ok(())
}

fn spawn_api(settings: &Settings, runtime: &FleetRuntime) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let config = ApiConfig::new("0.0.0.0", settings.api_port);
    let state = AppState::new(config.clone(), runtime.supervisor());
    let (tx, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        // The fleet keeps running without its introspection API.
        if let Err(e) = serve(&config, state, shutdown).await {
            error!(error = %e, address = %config.bind_address(), "API server failed");
        }
    });

    (tx, task)
}
