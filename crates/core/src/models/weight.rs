use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetId;
use super::portfolio::PortfolioId;

/// Decimal places kept for stored weights.
pub const WEIGHT_SCALE: u32 = 6;

/// Target weight of an asset in a portfolio on a given date.
/// Unique per (portfolio, asset, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub portfolio_id: PortfolioId,
    pub asset_id: AssetId,
    pub date: NaiveDate,
    /// Fraction of the portfolio (0.25 = 25%), rounded to [`WEIGHT_SCALE`] places
    #[serde(with = "rust_decimal::serde::str")]
    pub weight: Decimal,
}

impl Weight {
    pub fn new(portfolio_id: PortfolioId, asset_id: AssetId, date: NaiveDate, weight: Decimal) -> Self {
        Self {
            portfolio_id,
            asset_id,
            date,
            weight: weight.round_dp(WEIGHT_SCALE),
        }
    }
}
