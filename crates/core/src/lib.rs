pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;

use errors::CoreError;
use models::{
    asset::{Asset, AssetId},
    holding::Holding,
    ledger::Ledger,
    operation::{Operation, OperationRequest},
    portfolio::{Portfolio, PortfolioId},
    price::PricePoint,
    report::{ImportReport, OperationOutcome, SeedReport},
    valuation::{PortfolioEvolution, PortfolioValue, VizDefaults},
    weight::Weight,
};
use services::{
    import_service::{ImportOptions, ImportService},
    operation_service::OperationService,
    quantity_service::{QuantityService, SeedOptions},
    valuation_service::ValuationService,
};
use storage::{crypto::KdfParams, manager::StorageManager};

/// Main entry point for the Portfolio Tracker core library.
/// Holds the ledger and all services needed to operate on it.
#[must_use]
#[derive(Clone)]
pub struct PortfolioTracker {
    ledger: Ledger,
    import_service: ImportService,
    quantity_service: QuantityService,
    operation_service: OperationService,
    valuation_service: ValuationService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("assets", &self.ledger.assets.len())
            .field("portfolios", &self.ledger.portfolios.len())
            .field("prices", &self.ledger.prices.total_entries())
            .field("operations", &self.ledger.operations.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PortfolioTracker {
    /// Create a brand new empty ledger.
    pub fn create_new() -> Self {
        Self::build(Ledger::new())
    }

    /// Wrap an existing ledger.
    pub fn from_ledger(ledger: Ledger) -> Self {
        Self::build(ledger)
    }

    /// Load a ledger from encrypted bytes (password required).
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_bytes(encrypted, password)?;
        Ok(Self::build(ledger))
    }

    /// Save the ledger to encrypted bytes. Clears the unsaved-changes flag.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.ledger, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted store file on disk.
    pub fn load_from_file(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_file(path, password)?;
        Ok(Self::build(ledger))
    }

    /// Load from `path` if it exists, otherwise start an empty ledger.
    pub fn open_or_create(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path, password)
        } else {
            tracing::info!(path = %path.display(), "store file not found, starting an empty ledger");
            Ok(Self::create_new())
        }
    }

    /// Save to an encrypted store file. Clears the unsaved-changes flag.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>, password: &str) -> Result<(), CoreError> {
        self.save_to_file_with(path, password, &KdfParams::default())
    }

    /// Save with explicit key-derivation parameters.
    pub fn save_to_file_with(
        &mut self,
        path: impl AsRef<Path>,
        password: &str,
        kdf_params: &KdfParams,
    ) -> Result<(), CoreError> {
        StorageManager::save_to_file_with(&self.ledger, path, password, kdf_params)?;
        self.dirty = false;
        Ok(())
    }

    /// Returns `true` if the ledger has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ── Batch routines ──────────────────────────────────────────────

    /// Import a weights sheet and a prices sheet (CSV readers).
    pub fn import_sheets<W: Read, P: Read>(
        &mut self,
        weights_sheet: W,
        prices_sheet: P,
        options: &ImportOptions,
    ) -> Result<ImportReport, CoreError> {
        let report = self
            .import_service
            .import_sheets(&mut self.ledger, weights_sheet, prices_sheet, options)?;
        self.dirty = true;
        Ok(report)
    }

    /// Import the two sheets from CSV files on disk.
    pub fn import_sheet_files(
        &mut self,
        weights_path: impl AsRef<Path>,
        prices_path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<ImportReport, CoreError> {
        let report = self.import_service.import_sheet_files(
            &mut self.ledger,
            weights_path.as_ref(),
            prices_path.as_ref(),
            options,
        )?;
        self.dirty = true;
        Ok(report)
    }

    /// Compute `C_i,0 = w_i,0 × V0 / P_i,0` for the weights at `t0`.
    pub fn seed_initial_quantities(&mut self, options: &SeedOptions) -> Result<SeedReport, CoreError> {
        let report = self
            .quantity_service
            .seed_initial_quantities(&mut self.ledger, options)?;
        self.dirty = true;
        Ok(report)
    }

    // ── Operations & valuation ──────────────────────────────────────

    /// Record a batch of buy/sell operations (all-or-nothing) and revalue.
    pub fn register_operations(
        &mut self,
        portfolio_id: PortfolioId,
        requests: &[OperationRequest],
    ) -> Result<OperationOutcome, CoreError> {
        let outcome = self
            .operation_service
            .register_operations(&mut self.ledger, portfolio_id, requests)?;
        self.dirty = true;
        Ok(outcome)
    }

    /// `V_t` and `w_i,t` series of a portfolio over `[from, to]`.
    pub fn evolution(
        &self,
        portfolio_id: PortfolioId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PortfolioEvolution, CoreError> {
        self.valuation_service
            .evolution(&self.ledger, portfolio_id, from, to)
    }

    /// `V_t` of a portfolio on a single date, if any holding is priced.
    pub fn value_at(
        &self,
        portfolio_id: PortfolioId,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, CoreError> {
        self.valuation_service
            .value_at(&self.ledger, portfolio_id, date)
    }

    #[must_use]
    pub fn viz_defaults(&self) -> VizDefaults {
        self.valuation_service.viz_defaults(&self.ledger)
    }

    // ── Admin ───────────────────────────────────────────────────────

    /// Create an asset. Fails if the symbol is empty or already taken.
    pub fn create_asset(&mut self, symbol: &str, name: &str) -> Result<AssetId, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::ValidationError("Asset symbol must not be empty".into()));
        }
        if self.ledger.asset_by_symbol(symbol).is_some() {
            return Err(CoreError::ValidationError(format!(
                "Asset {symbol} already exists"
            )));
        }
        let name = if name.trim().is_empty() { symbol } else { name };
        let (id, _) = self.ledger.get_or_create_asset(symbol, name);
        self.dirty = true;
        Ok(id)
    }

    /// Create a portfolio. Fails if the name is empty.
    pub fn create_portfolio(&mut self, name: &str) -> Result<PortfolioId, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("Portfolio name must not be empty".into()));
        }
        let id = self.ledger.add_portfolio(name);
        self.dirty = true;
        Ok(id)
    }

    /// Insert or overwrite the price of an existing asset on a date.
    pub fn set_price(&mut self, symbol: &str, date: NaiveDate, price: Decimal) -> Result<(), CoreError> {
        if price < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Price must not be negative (got {price})"
            )));
        }
        let asset_id = self
            .ledger
            .asset_by_symbol(symbol)
            .map(|a| a.id)
            .ok_or_else(|| CoreError::AssetNotFound(symbol.to_string()))?;
        self.ledger.prices.set_price(asset_id, date, price);
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.ledger.assets
    }

    #[must_use]
    pub fn portfolios(&self) -> &[Portfolio] {
        &self.ledger.portfolios
    }

    /// Price history of an asset, oldest first.
    pub fn prices_for(&self, symbol: &str) -> Result<&[PricePoint], CoreError> {
        let asset = self
            .ledger
            .asset_by_symbol(symbol)
            .ok_or_else(|| CoreError::AssetNotFound(symbol.to_string()))?;
        Ok(self.ledger.prices.points_for(asset.id))
    }

    /// Weights, optionally restricted to one portfolio.
    #[must_use]
    pub fn weights(&self, portfolio_id: Option<PortfolioId>) -> Vec<&Weight> {
        self.ledger
            .weights
            .iter()
            .filter(|w| portfolio_id.map_or(true, |id| w.portfolio_id == id))
            .collect()
    }

    /// Holdings, optionally restricted to one portfolio.
    #[must_use]
    pub fn holdings(&self, portfolio_id: Option<PortfolioId>) -> Vec<&Holding> {
        self.ledger
            .holdings
            .iter()
            .filter(|h| portfolio_id.map_or(true, |id| h.portfolio_id == id))
            .collect()
    }

    /// Recorded operations, oldest first, optionally restricted to one portfolio.
    #[must_use]
    pub fn operations(&self, portfolio_id: Option<PortfolioId>) -> Vec<&Operation> {
        self.ledger
            .operations
            .iter()
            .filter(|o| portfolio_id.map_or(true, |id| o.portfolio_id == id))
            .collect()
    }

    /// Recorded portfolio values, optionally restricted to one portfolio.
    #[must_use]
    pub fn portfolio_values(&self, portfolio_id: Option<PortfolioId>) -> Vec<&PortfolioValue> {
        let mut values: Vec<&PortfolioValue> = self
            .ledger
            .values
            .iter()
            .filter(|v| portfolio_id.map_or(true, |id| v.portfolio_id == id))
            .collect();
        values.sort_by_key(|v| (v.portfolio_id, v.date));
        values
    }

    /// Export the full ledger as JSON (unencrypted snapshot for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: Ledger) -> Self {
        Self {
            ledger,
            import_service: ImportService::new(),
            quantity_service: QuantityService::new(),
            operation_service: OperationService::new(),
            valuation_service: ValuationService::new(),
            dirty: false,
        }
    }
}
