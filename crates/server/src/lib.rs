//! # Portfolio Tracker Server
//!
//! HTTP API over the portfolio tracker core: the dashboard endpoints
//! (evolution, operations, viz defaults), admin listings, and the batch
//! commands behind the `portfolio-tracker` binary.

#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use config::{LogFormat, ServerConfig};
pub use handlers::{AppState, StoreTarget};

/// The HTTP server.
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router with tracing and CORS layers.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config.host.parse().unwrap_or([127, 0, 0, 1].into()),
            self.config.port,
        );

        info!("Starting portfolio tracker on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,portfolio_tracker_core=debug,portfolio_tracker_server=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(false)).init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
    }
}
