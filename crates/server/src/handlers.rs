//! Request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use portfolio_tracker_core::models::operation::OperationRequest;
use portfolio_tracker_core::models::portfolio::PortfolioId;
use portfolio_tracker_core::PortfolioTracker;

use crate::error::ApiError;

/// Where and how the ledger is persisted after every mutation.
#[derive(Debug, Clone)]
pub struct StoreTarget {
    pub path: PathBuf,
    pub password: String,
}

/// Application state.
pub struct AppState {
    /// The ledger and its services
    pub tracker: RwLock<PortfolioTracker>,
    /// `None` keeps everything in memory (tests, demos)
    pub store: Option<StoreTarget>,
}

impl AppState {
    pub fn new(tracker: PortfolioTracker, store: Option<StoreTarget>) -> Self {
        Self {
            tracker: RwLock::new(tracker),
            store,
        }
    }

    pub fn in_memory(tracker: PortfolioTracker) -> Self {
        Self::new(tracker, None)
    }

    /// Save `updated` to the store file and only then make it the live tracker.
    ///
    /// If the save fails, `live` is left as it was. The save (Argon2id + write)
    /// runs on the blocking pool.
    async fn commit(
        &self,
        live: &mut PortfolioTracker,
        mut updated: PortfolioTracker,
    ) -> Result<(), ApiError> {
        if let Some(store) = self.store.clone() {
            if updated.has_unsaved_changes() {
                let (saved, result) = tokio::task::spawn_blocking(move || {
                    let result = updated.save_to_file(&store.path, &store.password);
                    (updated, result)
                })
                .await
                .map_err(|e| {
                    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Save task failed: {e}"))
                })?;
                result?;
                updated = saved;
            }
        }
        *live = updated;
        Ok(())
    }
}

type SharedState = Arc<AppState>;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `/` sends the browser to the dashboard defaults.
pub async fn root() -> Redirect {
    Redirect::temporary("/api/viz/")
}

// ── Evolution ──────────────────────────────────────────────────────

/// Query parameters of the evolution endpoint.
#[derive(Debug, Deserialize)]
pub struct EvolutionQuery {
    #[serde(alias = "fecha_inicio")]
    pub start_date: Option<String>,
    #[serde(alias = "fecha_fin")]
    pub end_date: Option<String>,
}

const INVALID_RANGE: &str =
    "start_date and end_date must be valid dates (YYYY-MM-DD) with start_date <= end_date.";

/// `GET /api/portfolios/{pf_id}/evolution/?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`
///
/// Returns `V_t` and `w_i,t` for the requested range.
pub async fn get_evolution(
    State(state): State<SharedState>,
    Path(pf_id): Path<String>,
    Query(query): Query<EvolutionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pf_id = parse_portfolio_id(&pf_id)?;
    let start = query.start_date.as_deref().and_then(parse_date);
    let end = query.end_date.as_deref().and_then(parse_date);
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s <= e => (s, e),
        _ => return Err(ApiError::bad_request(INVALID_RANGE)),
    };

    let tracker = state.tracker.read().await;
    let evolution = tracker.evolution(pf_id, start, end)?;
    Ok(Json(evolution))
}

// ── Operations ─────────────────────────────────────────────────────

/// `POST /api/portfolios/{pf_id}/operations/`
///
/// Body: JSON array of `{asset, date, quantity, type}`. Applied all-or-nothing.
pub async fn register_operations(
    State(state): State<SharedState>,
    Path(pf_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let pf_id = parse_portfolio_id(&pf_id)?;
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("Invalid JSON body."))?;
    if !value.is_array() {
        return Err(ApiError::bad_request("Invalid data format."));
    }
    let requests: Vec<OperationRequest> =
        serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mut tracker = state.tracker.write().await;
    let mut updated = tracker.clone();
    let outcome = updated.register_operations(pf_id, &requests)?;
    state.commit(&mut tracker, updated).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "detail": "Operations recorded and portfolio recalculated.",
            "recorded": outcome.recorded,
            "revalued": outcome.revalued,
        })),
    ))
}

/// `GET /api/viz/` — defaults for the dashboard form.
pub async fn viz_defaults(State(state): State<SharedState>) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    Json(tracker.viz_defaults())
}

// ── Admin ──────────────────────────────────────────────────────────

/// Optional portfolio filter of the admin listings.
#[derive(Debug, Default, Deserialize)]
pub struct PortfolioFilter {
    pub portfolio_id: Option<PortfolioId>,
}

#[derive(Debug, Deserialize)]
pub struct PriceFilter {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPriceRequest {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: Decimal,
}

pub async fn list_assets(State(state): State<SharedState>) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    Json(tracker.assets().to_vec())
}

pub async fn create_asset(
    State(state): State<SharedState>,
    Json(request): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tracker = state.tracker.write().await;
    let mut updated = tracker.clone();
    let name = request.name.unwrap_or_default();
    let id = updated.create_asset(&request.symbol, &name)?;
    state.commit(&mut tracker, updated).await?;
    info!(id, symbol = %request.symbol, "asset created");
    let asset = tracker.assets().iter().find(|a| a.id == id).cloned();
    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn list_portfolios(State(state): State<SharedState>) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    Json(tracker.portfolios().to_vec())
}

pub async fn create_portfolio(
    State(state): State<SharedState>,
    Json(request): Json<CreatePortfolioRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tracker = state.tracker.write().await;
    let mut updated = tracker.clone();
    let id = updated.create_portfolio(&request.name)?;
    state.commit(&mut tracker, updated).await?;
    info!(id, name = %request.name, "portfolio created");
    let portfolio = tracker.portfolios().iter().find(|p| p.id == id).cloned();
    Ok((StatusCode::CREATED, Json(portfolio)))
}

pub async fn list_prices(
    State(state): State<SharedState>,
    Query(filter): Query<PriceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let tracker = state.tracker.read().await;
    let points = tracker.prices_for(&filter.symbol)?.to_vec();
    Ok(Json(points))
}

pub async fn set_price(
    State(state): State<SharedState>,
    Json(request): Json<SetPriceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tracker = state.tracker.write().await;
    let mut updated = tracker.clone();
    updated.set_price(&request.symbol, request.date, request.price)?;
    state.commit(&mut tracker, updated).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_weights(
    State(state): State<SharedState>,
    Query(filter): Query<PortfolioFilter>,
) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    let weights: Vec<_> = tracker.weights(filter.portfolio_id).into_iter().cloned().collect();
    Json(weights)
}

pub async fn list_quantities(
    State(state): State<SharedState>,
    Query(filter): Query<PortfolioFilter>,
) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    let holdings: Vec<_> = tracker.holdings(filter.portfolio_id).into_iter().cloned().collect();
    Json(holdings)
}

pub async fn list_operations(
    State(state): State<SharedState>,
    Query(filter): Query<PortfolioFilter>,
) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    let operations: Vec<_> = tracker.operations(filter.portfolio_id).into_iter().cloned().collect();
    Json(operations)
}

pub async fn list_values(
    State(state): State<SharedState>,
    Query(filter): Query<PortfolioFilter>,
) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    let values: Vec<_> = tracker
        .portfolio_values(filter.portfolio_id)
        .into_iter()
        .cloned()
        .collect();
    Json(values)
}

/// Path ids are parsed here so a bad id gets the usual `{"detail"}` body.
fn parse_portfolio_id(raw: &str) -> Result<PortfolioId, ApiError> {
    raw.trim().parse().map_err(|_| {
        ApiError::bad_request(format!("Invalid portfolio id '{raw}': expected a positive integer."))
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
