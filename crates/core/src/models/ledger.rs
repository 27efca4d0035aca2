use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::{Asset, AssetId};
use super::holding::Holding;
use super::operation::Operation;
use super::portfolio::{Portfolio, PortfolioId};
use super::price::PriceBook;
use super::valuation::PortfolioValue;
use super::weight::Weight;

/// The main data container. Everything in here gets serialized,
/// encrypted, and saved to the `.pftk` store file.
///
/// Contains every table of the tracker: assets, portfolios, prices,
/// target weights, current holdings, recorded operations and portfolio
/// values. Collections are small, so plain vectors with linear lookups
/// are used everywhere except prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub assets: Vec<Asset>,
    pub portfolios: Vec<Portfolio>,
    pub prices: PriceBook,
    pub weights: Vec<Weight>,
    pub holdings: Vec<Holding>,
    /// Recorded operations, oldest date first
    pub operations: Vec<Operation>,
    pub values: Vec<PortfolioValue>,
    next_asset_id: AssetId,
    next_portfolio_id: PortfolioId,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            portfolios: Vec::new(),
            prices: PriceBook::new(),
            weights: Vec::new(),
            holdings: Vec::new(),
            operations: Vec::new(),
            values: Vec::new(),
            next_asset_id: 1,
            next_portfolio_id: 1,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Assets ──────────────────────────────────────────────────────

    pub fn asset_by_symbol(&self, symbol: &str) -> Option<&Asset> {
        let symbol = symbol.trim();
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn asset_by_id(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Look up an asset by symbol, creating it with `name` if missing.
    /// Returns the asset id and whether it was created.
    pub fn get_or_create_asset(&mut self, symbol: &str, name: &str) -> (AssetId, bool) {
        if let Some(existing) = self.asset_by_symbol(symbol) {
            return (existing.id, false);
        }
        let id = self.next_asset_id;
        self.next_asset_id += 1;
        self.assets.push(Asset::new(id, symbol, name));
        (id, true)
    }

    // ── Portfolios ──────────────────────────────────────────────────

    pub fn portfolio_by_id(&self, id: PortfolioId) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == id)
    }

    pub fn portfolio_by_name(&self, name: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.name == name)
    }

    /// Look up a portfolio by name, creating it if missing.
    pub fn get_or_create_portfolio(&mut self, name: &str) -> PortfolioId {
        if let Some(existing) = self.portfolio_by_name(name) {
            return existing.id;
        }
        self.add_portfolio(name)
    }

    /// Always creates a new portfolio, even if the name is taken.
    pub fn add_portfolio(&mut self, name: &str) -> PortfolioId {
        let id = self.next_portfolio_id;
        self.next_portfolio_id += 1;
        self.portfolios.push(Portfolio::new(id, name));
        id
    }

    /// Portfolio with the lowest id, if any.
    pub fn first_portfolio(&self) -> Option<&Portfolio> {
        self.portfolios.iter().min_by_key(|p| p.id)
    }

    // ── Weights ─────────────────────────────────────────────────────

    /// Insert a weight unless (portfolio, asset, date) already has one.
    pub fn insert_weight_if_absent(&mut self, weight: Weight) -> bool {
        let exists = self.weights.iter().any(|w| {
            w.portfolio_id == weight.portfolio_id
                && w.asset_id == weight.asset_id
                && w.date == weight.date
        });
        if exists {
            return false;
        }
        self.weights.push(weight);
        true
    }

    pub fn weights_on(&self, date: NaiveDate) -> Vec<&Weight> {
        self.weights.iter().filter(|w| w.date == date).collect()
    }

    // ── Holdings ────────────────────────────────────────────────────

    pub fn holding(&self, portfolio_id: PortfolioId, asset_id: AssetId) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|h| h.portfolio_id == portfolio_id && h.asset_id == asset_id)
    }

    pub fn holdings_for(&self, portfolio_id: PortfolioId) -> Vec<&Holding> {
        self.holdings
            .iter()
            .filter(|h| h.portfolio_id == portfolio_id)
            .collect()
    }

    /// Set the quantity of (portfolio, asset), creating the holding if missing.
    /// Returns `true` when a new holding was created.
    pub fn upsert_holding(&mut self, portfolio_id: PortfolioId, asset_id: AssetId, quantity: Decimal) -> bool {
        let holding = Holding::new(portfolio_id, asset_id, quantity);
        match self
            .holdings
            .iter_mut()
            .find(|h| h.portfolio_id == portfolio_id && h.asset_id == asset_id)
        {
            Some(existing) => {
                *existing = holding;
                false
            }
            None => {
                self.holdings.push(holding);
                true
            }
        }
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Insert an operation keeping `operations` date-sorted (stable for equal dates).
    pub fn push_operation(&mut self, operation: Operation) {
        let pos = self
            .operations
            .partition_point(|o| o.date <= operation.date);
        self.operations.insert(pos, operation);
    }

    pub fn operations_for(&self, portfolio_id: PortfolioId) -> Vec<&Operation> {
        self.operations
            .iter()
            .filter(|o| o.portfolio_id == portfolio_id)
            .collect()
    }

    // ── Portfolio values ────────────────────────────────────────────

    /// Record `V_t` for (portfolio, date), replacing any previous value.
    pub fn upsert_portfolio_value(&mut self, value: PortfolioValue) {
        match self
            .values
            .iter_mut()
            .find(|v| v.portfolio_id == value.portfolio_id && v.date == value.date)
        {
            Some(existing) => *existing = value,
            None => self.values.push(value),
        }
    }

    /// Recorded values of a portfolio, oldest first.
    pub fn values_for(&self, portfolio_id: PortfolioId) -> Vec<&PortfolioValue> {
        let mut values: Vec<&PortfolioValue> = self
            .values
            .iter()
            .filter(|v| v.portfolio_id == portfolio_id)
            .collect();
        values.sort_by_key(|v| v.date);
        values
    }
}
