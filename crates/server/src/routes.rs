//! Route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{self, AppState};

/// Create the API router.
///
/// Dashboard paths are registered with and without the trailing slash.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Dashboard API
        .route("/api/portfolios/{pf_id}/evolution/", get(handlers::get_evolution))
        .route("/api/portfolios/{pf_id}/evolution", get(handlers::get_evolution))
        .route("/api/portfolios/{pf_id}/operations/", post(handlers::register_operations))
        .route("/api/portfolios/{pf_id}/operations", post(handlers::register_operations))
        .route("/api/viz/", get(handlers::viz_defaults))
        .route("/api/viz", get(handlers::viz_defaults))
        // Admin
        .route("/admin/assets", get(handlers::list_assets).post(handlers::create_asset))
        .route("/admin/portfolios", get(handlers::list_portfolios).post(handlers::create_portfolio))
        .route("/admin/prices", get(handlers::list_prices).put(handlers::set_price))
        .route("/admin/weights", get(handlers::list_weights))
        .route("/admin/quantities", get(handlers::list_quantities))
        .route("/admin/operations", get(handlers::list_operations))
        .route("/admin/values", get(handlers::list_values))
        .with_state(state)
}
