//! `portfolio-tracker` binary: HTTP server and batch commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use portfolio_tracker_core::services::import_service::ImportOptions;
use portfolio_tracker_core::services::quantity_service::{SeedOptions, DEFAULT_PF1, DEFAULT_PF2};
use portfolio_tracker_core::PortfolioTracker;
use portfolio_tracker_server::commands::{self, parse_t0, parse_v0};
use portfolio_tracker_server::{init_tracing, AppState, Server, ServerConfig, StoreTarget};

#[derive(Debug, Parser)]
#[command(name = "portfolio-tracker", version, about = "Portfolio valuation tracker")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Encrypted store file (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Store password
    #[arg(long, global = true, env = "PORTFOLIO_TRACKER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import assets, prices and weights from two CSV sheets
    Import {
        /// Weights sheet (asset column + two numeric portfolio columns)
        weights: PathBuf,
        /// Prices sheet (date column + one column per asset)
        prices: PathBuf,
        /// Date the weights are stored at (YYYY-MM-DD)
        #[arg(long, default_value = "2022-02-15")]
        start_date: String,
        #[arg(long, default_value = DEFAULT_PF1)]
        pf1: String,
        #[arg(long, default_value = DEFAULT_PF2)]
        pf2: String,
    },
    /// Compute C_i,0 = w_i,0 * V0 / P_i,0 for every weight at t0
    InitQuantities {
        #[arg(long, default_value = "2022-02-15")]
        t0: String,
        #[arg(long, default_value = "1000000000")]
        v0: String,
        #[arg(long, default_value = DEFAULT_PF1)]
        pf1: String,
        #[arg(long, default_value = DEFAULT_PF2)]
        pf2: String,
        /// Replace quantities that already exist
        #[arg(long)]
        overwrite: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())
        .with_context(|| "failed to load configuration")?;
    init_tracing(config.log_format);

    if let Some(store) = cli.store {
        config.store_path = store;
    }
    let password = cli
        .password
        .ok_or_else(|| anyhow!("A store password is required (--password or PORTFOLIO_TRACKER_PASSWORD)."))?;
    let store = StoreTarget {
        path: config.store_path.clone(),
        password,
    };

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            info!("Portfolio Tracker v{}", env!("CARGO_PKG_VERSION"));
            let tracker = PortfolioTracker::open_or_create(&store.path, &store.password)?;
            info!(?tracker, "store loaded");
            let state = Arc::new(AppState::new(tracker, Some(store)));
            Server::new(config, state).start().await?;
        }
        Command::Import {
            weights,
            prices,
            start_date,
            pf1,
            pf2,
        } => {
            let options = ImportOptions {
                start_date: parse_t0(&start_date)?,
                pf1,
                pf2,
            };
            let report = commands::run_import(&store, &weights, &prices, &options)?;
            println!("{}", commands::import_summary(&report));
        }
        Command::InitQuantities {
            t0,
            v0,
            pf1,
            pf2,
            overwrite,
        } => {
            let options = SeedOptions {
                t0: parse_t0(&t0)?,
                v0: parse_v0(&v0)?,
                pf1,
                pf2,
                overwrite,
            };
            let report = commands::run_init_quantities(&store, &options)?;
            println!("{}", commands::seed_summary(&report));
        }
    }

    Ok(())
}
