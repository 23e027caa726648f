pub mod errors;
pub mod routes;

use crate::core::config::AppConfig;
use crate::core::{PriceFeed, ProductStore};
use crate::refresh::{PriceRefresher, spawn_periodic_refresh};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

/// Shared handles every request handler works with.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<PriceFeed>,
    pub store: Arc<dyn ProductStore>,
    pub refresher: Arc<PriceRefresher>,
}

pub fn build_router(state: AppState) -> Router {
    let gold = Router::new()
        .route("/price/:karat", get(routes::price_per_gram))
        .route("/calculate", post(routes::calculate_price))
        .route("/refresh", post(routes::refresh_prices));

    let products = Router::new()
        .route("/", get(routes::list_products).post(routes::create_product))
        .route("/:id", get(routes::get_product));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api/gold", gold)
        .nest("/api/products", products)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address: {}:{}",
                config.server.host, config.server.port
            )
        })
}

/// Serves the API until Ctrl-C, running scheduled refreshes if configured.
pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let scheduled = config
        .refresh
        .interval()
        .map(|period| spawn_periodic_refresh(Arc::clone(&state.refresher), period));

    let addr = bind_addr(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Pricing server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    if let Some(handle) = scheduled {
        handle.abort();
    }
    Ok(())
}
