use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use auth_zanzibar::{new_authorization_handler, AuthzConfig};
use authz_sync::{AuthzHandle, DomainEvent, SyncRuntime};
use events_bus::{EventRegistry, LocalEventBus, NatsConfig, NatsEventBus, ShutdownToken};

mod config;

use config::{Args, BusKind};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may be set directly.
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose, args.json_output())?;

    info!("Starting heureka event handler");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let authz_config = AuthzConfig::from_env().context("invalid authorization configuration")?;
    info!(config = ?authz_config, "authorization configuration loaded");
    let authz = new_authorization_handler(&authz_config)
        .await
        .context("failed to initialize the authorization store")?;

    match args.bus {
        BusKind::Local => {
            info!(capacity = args.local_capacity, "using in-process event bus");
            serve(LocalEventBus::with_capacity(args.local_capacity), authz).await
        }
        BusKind::Nats => {
            let nats = NatsConfig::from_env();
            let bus = NatsEventBus::connect(nats.clone())
                .await
                .with_context(|| format!("failed to connect to NATS at {}", nats.server_url))?;
            serve(bus, authz).await
        }
    }
}

async fn serve<B>(bus: B, authz: AuthzHandle) -> Result<()>
where
    B: EventRegistry<DomainEvent>,
{
    let (token, watcher) = ShutdownToken::new();
    let runtime = SyncRuntime::open(bus, authz, watcher)
        .await
        .context("failed to start the authorization synchronizer")?;

    shutdown_signal().await;
    info!("shutdown signal received");

    token.cancel();
    runtime.close().await.context("event bus did not shut down cleanly")?;
    info!("event handler stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        [
            format!("event_handler={level}"),
            format!("authz_sync={level}"),
            format!("auth_zanzibar={level}"),
            format!("events_bus={level}"),
            "async_nats=warn".to_string(),
            "reqwest=info".to_string(),
        ]
        .join(",")
        .into()
    });

    if json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
            .context("failed to install tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
            .context("failed to install tracing subscriber")?;
    }

    Ok(())
}
