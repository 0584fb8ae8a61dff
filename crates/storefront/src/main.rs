//! Soirn Storefront - JSON API behind the brand site.
//!
//! This binary serves waitlist signups, the session cart, the product catalog
//! and hosted checkout hand-off on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Shopify Storefront API for hosted checkout (Shopify owns payment)
//! - `PostgreSQL` for the waitlist and sessions
//! - Static JSON product catalog loaded at startup

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soirn_storefront::catalog::Catalog;
use soirn_storefront::config::StorefrontConfig;
use soirn_storefront::db::{self, WaitlistRepository};
use soirn_storefront::middleware::{self, FixedWindowLimiter};
use soirn_storefront::shopify::StorefrontClient;
use soirn_storefront::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Periodically drop expired signup rate limit windows.
fn spawn_limiter_pruning(limiter: FixedWindowLimiter) {
    let period = limiter.window();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            limiter.prune_expired();
            tracing::debug!(tracked_clients = limiter.len(), "Pruned signup rate limit windows");
        }
    });
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "soirn_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let catalog = Catalog::load(&config.catalog_path).expect("Failed to load product catalog");
    tracing::info!(
        path = %config.catalog_path.display(),
        products = catalog.products().len(),
        "Catalog loaded"
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p soirn-cli -- migrate

    let storefront =
        StorefrontClient::new(&config.shopify).expect("Failed to create Shopify client");
    tracing::info!(endpoint = %storefront.endpoint(), "Shopify Storefront client ready");

    let state = AppState::new(
        Arc::new(WaitlistRepository::new(pool.clone())),
        Arc::new(storefront),
        catalog,
        config.waitlist,
    );
    spawn_limiter_pruning(state.gateway().limiter().clone());

    let session_layer = middleware::create_session_layer(&pool, &config);

    let mut app = soirn_storefront::build_router(state, session_layer);
    if config.is_secure() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_middleware));
    }
    let app = app
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

