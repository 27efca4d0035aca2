use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::AssetId;
use super::portfolio::PortfolioId;

/// Decimal places kept for stored quantities.
pub const QUANTITY_SCALE: u32 = 6;

/// Current quantity of an asset held by a portfolio.
///
/// There is exactly one holding per (portfolio, asset). It is not a time
/// series: valuations over past dates apply the current quantity to the
/// historical prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub portfolio_id: PortfolioId,
    pub asset_id: AssetId,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
}

impl Holding {
    pub fn new(portfolio_id: PortfolioId, asset_id: AssetId, quantity: Decimal) -> Self {
        Self {
            portfolio_id,
            asset_id,
            quantity: quantity.round_dp(QUANTITY_SCALE),
        }
    }
}
