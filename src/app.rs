/*
 * Responsibility
 * - tracing + panic hook, Config, collaborators (pool, identity, blob store) -> AppState
 * - Router assembly: /api, /uploads, /, then cross-cutting middleware
 * - serve with graceful shutdown; close the pool afterwards
 */
use std::net::SocketAddr;
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::{itinerary_repo::PgItineraryRepo, user_repo::PgUserDirectory};
use crate::services::{blob::LocalBlobStore, identity::build_identity_provider};
use crate::state::AppState;

const UPLOADS_PREFIX: &str = "/uploads";

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,urbanatlas_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            return Err(err.into());
        }
    };
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting UrbanAtlas API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("database unreachable")?;
    tracing::info!("database connected");

    let state = build_state(&config, pool.clone())?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    pool.close().await;
    tracing::info!("database pool closed; bye");

    Ok(())
}

fn build_state(config: &Config, pool: sqlx::PgPool) -> Result<AppState> {
    let identity = build_identity_provider(config)?;
    let users = Arc::new(PgUserDirectory::new(pool.clone()));
    let itineraries = Arc::new(PgItineraryRepo::new(pool));
    let blobs = Arc::new(LocalBlobStore::new(
        config.upload_dir.clone(),
        UPLOADS_PREFIX,
    ));

    Ok(AppState::new(identity, users, itineraries, blobs))
}

fn build_router(state: AppState, config: &Config) -> Router {
    async fn root() -> &'static str {
        "Server is running..."
    }

    let router = Router::new()
        .route("/", get(root))
        .nest("/api", api::routes(state.clone()))
        .nest_service(
            UPLOADS_PREFIX,
            middleware::security_headers::uploads(&config.upload_dir),
        )
        .with_state(state);

    // each apply wraps the previous one; http (request id, trace, limits) ends up outermost
    // so 429s and CORS preflights are logged too
    let router = middleware::security_headers::apply(router);
    let router = middleware::rate_limit::apply(router, config);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
