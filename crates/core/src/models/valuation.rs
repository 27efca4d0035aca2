use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::portfolio::PortfolioId;

/// Decimal places kept for stored portfolio values.
pub const VALUE_SCALE: u32 = 2;

/// Total value `V_t` of a portfolio on a date, as recorded in the ledger.
/// Unique per (portfolio, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValue {
    pub portfolio_id: PortfolioId,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_value: Decimal,
}

impl PortfolioValue {
    pub fn new(portfolio_id: PortfolioId, date: NaiveDate, total_value: Decimal) -> Self {
        Self {
            portfolio_id,
            date,
            total_value: total_value.round_dp(VALUE_SCALE),
        }
    }
}

/// Portfolio identity echoed back in evolution responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRef {
    pub id: PortfolioId,
    pub name: String,
}

/// Inclusive date range of an evolution query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `V_t` on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// `w_i,t` of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    /// Asset symbol
    pub asset: String,
    pub value: f64,
}

/// All asset weights on one date, ordered by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    pub date: NaiveDate,
    pub w: Vec<AssetWeight>,
}

/// Value and weight time series of a portfolio over a date range.
///
/// The core computes all the numbers (in `Decimal`); floats only appear
/// here, at the output edge, for the dashboard to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEvolution {
    pub portfolio: PortfolioRef,
    pub range: DateRange,
    #[serde(rename = "Vt")]
    pub value_series: Vec<ValuePoint>,
    pub weights: Vec<WeightSnapshot>,
}

/// Defaults the dashboard pre-fills its form with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizDefaults {
    pub pf_id: PortfolioId,
    pub fi: NaiveDate,
    pub ff: NaiveDate,
}
