// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finance_auth_server::api::router;
use finance_auth_server::auth::RevocationSweeper;
use finance_auth_server::clock::SystemClock;
use finance_auth_server::config::{LogFormat, Settings, DEFAULT_LOG_FILTER};
use finance_auth_server::state::AppState;
use finance_auth_server::store::InMemoryUserDirectory;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(settings.log_format);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let clock = Arc::new(SystemClock);
    let state = AppState::new(
        &settings.auth,
        Arc::new(InMemoryUserDirectory::new()),
        clock.clone(),
    )?;

    if let Some(admin) = &settings.auth.bootstrap_admin {
        state.seed_admin(admin).await?;
    }

    let shutdown = CancellationToken::new();
    let sweeper = RevocationSweeper::new(
        Arc::clone(&state.revocations),
        clock,
        settings.auth.sweep_interval,
    );
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Finance auth server listening (docs at /docs)");

    let app = router(state);
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
                _ = signal.cancelled() => {}
            }
        })
        .await?;

    shutdown.cancel();
    sweeper_handle.await?;
    info!("Server stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
