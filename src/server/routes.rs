use super::AppState;
use super::errors::ApiError;
use crate::core::pricing::{
    compute_price, karat_from_number, parse_karat, purity_adjusted, validate_item,
};
use crate::core::{PricingError, Product};
use crate::refresh::RefreshReport;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn currency_key(currency: &str) -> String {
    currency.to_lowercase()
}

/// Per-gram price of gold at the requested purity, in both currencies.
pub async fn price_per_gram(
    State(state): State<AppState>,
    Path(karat): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let karat = parse_karat(&karat)?;
    let quote = state.feed.fetch_quote().await?;

    let base_price = purity_adjusted(quote.gold_per_gram, karat);
    let target_price = base_price * quote.exchange_rate;
    let base = currency_key(state.feed.base_currency());
    let target = currency_key(state.feed.target_currency());

    let mut body = Map::new();
    body.insert(
        format!("price_per_gram_{base}"),
        Value::String(format!("{base_price:.2}")),
    );
    body.insert(
        format!("price_per_gram_{target}"),
        Value::String(format!("{target_price:.2}")),
    );
    body.insert(format!("{target}_rate"), json!(quote.exchange_rate));
    body.insert("karat".to_string(), Value::String(format!("{karat}k")));
    Ok(Json(Value::Object(body)))
}

/// Karat as clients send it: a number (`18`, `18.0`) or text (`"18"`, `"18k"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum KaratInput {
    Number(f64),
    Text(String),
}

impl KaratInput {
    fn resolve(&self) -> Result<u8, PricingError> {
        match self {
            KaratInput::Number(value) => karat_from_number(*value),
            KaratInput::Text(raw) => parse_karat(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePriceRequest {
    pub karat: Option<KaratInput>,
    pub weight: Option<f64>,
    pub making_charges: Option<f64>,
}

/// Prices an item that is not in the store.
pub async fn calculate_price(
    State(state): State<AppState>,
    payload: Result<Json<CalculatePriceRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let (Some(karat), Some(weight), Some(making_charges)) =
        (body.karat, body.weight, body.making_charges)
    else {
        return Err(ApiError::bad_request(
            "weight, karat, makingCharges are required",
        ));
    };
    let karat = karat.resolve()?;
    validate_item(karat, weight, making_charges)?;

    let quote = state.feed.fetch_quote().await?;
    let breakdown = compute_price(
        karat,
        weight,
        making_charges,
        quote.gold_per_gram,
        quote.exchange_rate,
    )?;

    let target = currency_key(state.feed.target_currency());
    let mut body = Map::new();
    body.insert(
        format!("gold_price_per_gram_{target}"),
        Value::String(format!("{:.2}", breakdown.per_gram_target)),
    );
    body.insert(
        format!("total_price_{target}"),
        Value::String(format!("{:.2}", breakdown.total)),
    );
    Ok(Json(Value::Object(body)))
}

/// Runs a full refresh and answers once every product has been processed.
pub async fn refresh_prices(
    State(state): State<AppState>,
) -> Result<Json<RefreshReport>, ApiError> {
    let report = state.refresher.refresh_all_prices().await?;
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "Manual price refresh completed"
    );
    Ok(Json(report))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.list_products().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .store
        .get_product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("product {id} not found")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub karat: KaratInput,
    pub weight: f64,
    #[serde(default)]
    pub making_charges: f64,
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(body) = payload?;
    let karat = body.karat.resolve()?;
    validate_item(karat, body.weight, body.making_charges)?;

    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let product = Product {
        id,
        name: body.name,
        karat,
        weight: body.weight,
        making_charges: body.making_charges,
        price: None,
        gold_price: None,
        last_price_update: None,
    };
    if !state.store.create_product(product.clone()).await? {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "conflict",
            format!("product {} already exists", product.id),
        ));
    }
    Ok((StatusCode::CREATED, Json(product)))
}
