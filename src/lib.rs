pub mod cli;
pub mod core;
pub mod providers;
pub mod refresh;
pub mod server;
pub mod store;

use crate::core::PriceFeed;
use crate::core::config::AppConfig;
use crate::providers::{ExchangeRateApiProvider, GoldApiProvider, util::http_client};
use crate::refresh::PriceRefresher;
use crate::server::AppState;
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Refresh,
    Quote { karat: Option<String> },
}

/// Wires feed providers, product store and refresher from the config.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let client = http_client(config.providers.timeout())?;

    let gold = GoldApiProvider::new(
        &config.providers.gold.base_url,
        config.pricing.grams_per_ounce,
        client.clone(),
    )
    .with_retries(config.providers.retries);
    let rates = ExchangeRateApiProvider::new(&config.providers.exchange.base_url, client)
        .with_retries(config.providers.retries);

    let feed = Arc::new(PriceFeed::new(
        Arc::new(gold),
        Arc::new(rates),
        &config.pricing.base_currency,
        &config.pricing.target_currency,
    ));
    let store = store::open_product_store(config)?;
    let refresher = Arc::new(PriceRefresher::new(
        Arc::clone(&store),
        Arc::clone(&feed),
        config.refresh.reuse_quotes,
    ));

    Ok(AppState {
        feed,
        store,
        refresher,
    })
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("karat starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    if matches!(command, AppCommand::Refresh) && config.data_path.is_none() {
        bail!(
            "refresh needs data_path in the config: without it products live in memory and there is nothing to refresh"
        );
    }

    let state = build_state(&config)?;

    match command {
        AppCommand::Serve => server::serve(&config, state).await,
        AppCommand::Refresh => cli::refresh::run_refresh(&state.refresher).await,
        AppCommand::Quote { karat } => cli::quote::display_quote(&state.feed, karat.as_deref()).await,
    }
}
