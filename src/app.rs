/*
 * Responsibility
 * - Load Config -> build dependencies -> assemble the Router
 * - Apply middleware (access guard, CORS, security headers, HTTP infra)
 * - Start serving with axum::serve()
 */
use anyhow::Result;
use axum::Router;
use std::{panic, process, sync::Arc};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_access_guard;
use crate::services::cache::{CacheClient, NullCache, ValkeyClient};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bazaar_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost
        // (stderr can be hidden depending on how the process is launched).
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        // In production, prefer the default behavior (stderr) and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!().run(&db).await?;

    let cache: Arc<dyn CacheClient> = match &config.cache_url {
        Some(url) => {
            let client = ValkeyClient::new(url).await?;
            tracing::info!(backend = client.backend_name(), "cache connected");
            Arc::new(client)
        }
        None => {
            tracing::info!("CACHE_URL not set, running uncached");
            Arc::new(NullCache)
        }
    };

    // The permission table is declared next to the routes; built once here and
    // immutable for the life of the process.
    let guard = build_access_guard(config, api::v1::permissions())?;

    Ok(AppState::new(db, cache, guard))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let app = api::v1::routes(state.clone()).with_state(state);

    let app = middleware::security_headers::apply(app, config);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app, config)
}
