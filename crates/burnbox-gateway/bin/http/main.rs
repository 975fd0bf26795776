mod cli;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use burnbox_core::{KeyValueStore, PasteManager};
use burnbox_gateway::extract::parse_epoch_millis;
use burnbox_gateway::sweeper::spawn_sweeper;
use burnbox_gateway::{App, AppState};
use burnbox_generator::random::RandomGenerator;
use burnbox_lifecycle::{PasteService, ServiceSettings};
use burnbox_storage::{InMemoryStore, RedisStore};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cli::{Cli, StorageBackendArg};

/// Slack on top of the content cap for JSON escaping and the other fields.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        max_content_bytes = config.max_content_bytes,
        test_mode = config.test_mode,
        "starting burnbox"
    );

    let settings = ServiceSettings::builder()
        .max_content_bytes(config.max_content_bytes)
        .build();

    let (manager, sweeper): (Arc<dyn PasteManager>, Option<JoinHandle<()>>) = match config.storage
    {
        StorageBackendArg::InMemory => {
            let service = build_service(InMemoryStore::new(), settings);
            let sweeper = spawn_sweeper(
                service.store(),
                Duration::from_secs(config.sweep_interval_secs.max(1)),
            );
            (Arc::new(service), Some(sweeper))
        }
        StorageBackendArg::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let store = RedisStore::connect(url, config.redis_key_prefix.clone())
                .await
                .context("failed to connect to redis")?;
            (Arc::new(build_service(store, settings)), None)
        }
    };

    let body_limit = config
        .max_content_bytes
        .saturating_mul(4)
        .saturating_add(BODY_OVERHEAD_BYTES);
    let test_now = config
        .test_now_ms
        .as_deref()
        .map(|raw| {
            parse_epoch_millis(raw).with_context(|| format!("invalid test time: {raw}"))
        })
        .transpose()?;
    let mut state = AppState::new(manager)
        .with_test_mode(config.test_mode)
        .with_test_now(test_now)
        .with_body_limit(body_limit);
    if let Some(base_url) = &config.public_base_url {
        state = state.with_public_base_url(base_url.trim_end_matches('/'));
    }

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("shut down");
    Ok(())
}

fn build_service<S: KeyValueStore>(
    store: S,
    settings: ServiceSettings,
) -> PasteService<S, RandomGenerator> {
    PasteService::new(store, RandomGenerator::new()).with_settings(settings)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
}
