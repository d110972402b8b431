//! `simple-shop-server`: the storefront, the back-office and the JSON API
//! behind one listener.
//!
//! The schema must already be in place; this binary never migrates. Use
//! `shop-cli migrate` first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::process::ExitCode;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use simple_shop_server::config::ShopConfig;
use simple_shop_server::state::AppState;
use simple_shop_server::{db, middleware};

const DEFAULT_LOG_FILTER: &str = "simple_shop_server=info,tower_http=debug";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("simple-shop-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The Sentry client has to exist before its tracing layer is installed.
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| start_sentry(dsn, &config));
    init_tracing();

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ShopConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database_url).await?;
    let addr = config.socket_addr();

    let state = AppState::new(config, pool);
    tracing::info!(providers = ?state.oauth().enabled(), "Sign-in providers");

    let sessions = middleware::create_session_layer(state.pool(), state.config());
    let app = simple_shop_server::app(state, sessions)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Simple Shop listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn start_sentry(dsn: &str, config: &ShopConfig) -> sentry::ClientInitGuard {
    sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ))
}

fn init_tracing() {
    // Warnings and errors become Sentry events, info and debug ride along as
    // breadcrumbs.
    let to_sentry = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(to_sentry)
        .init();
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
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

    tracing::info!("Shutting down");
}
