use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::AssetId;
use super::portfolio::PortfolioId;

/// Direction of an operation.
///
/// Wire names are `"buy"` / `"sell"`; the legacy `"compra"` / `"venta"`
/// names are still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Increases the held quantity
    #[serde(alias = "compra")]
    Buy,
    /// Decreases the held quantity
    #[serde(alias = "venta")]
    Sell,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Buy => write!(f, "Buy"),
            OperationType::Sell => write!(f, "Sell"),
        }
    }
}

/// A recorded buy/sell of an asset in a portfolio.
///
/// Operations do NOT store a price. Their effect is folded into the
/// portfolio's [`Holding`](super::holding::Holding) when they are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub portfolio_id: PortfolioId,
    pub asset_id: AssetId,
    pub date: NaiveDate,
    /// Always positive; the direction is in `operation_type`
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub operation_type: OperationType,
}

impl Operation {
    pub fn new(
        portfolio_id: PortfolioId,
        asset_id: AssetId,
        date: NaiveDate,
        quantity: Decimal,
        operation_type: OperationType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id,
            asset_id,
            date,
            quantity,
            operation_type,
        }
    }

    /// Quantity change this operation applies to a holding.
    pub fn signed_quantity(&self) -> Decimal {
        match self.operation_type {
            OperationType::Buy => self.quantity,
            OperationType::Sell => -self.quantity,
        }
    }
}

/// One entry of a register-operations request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Asset symbol
    #[serde(alias = "activo")]
    pub asset: String,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "cantidad")]
    pub quantity: Decimal,
    #[serde(rename = "type", alias = "tipo")]
    pub operation_type: OperationType,
}

impl OperationRequest {
    pub fn new(
        asset: impl Into<String>,
        date: NaiveDate,
        quantity: Decimal,
        operation_type: OperationType,
    ) -> Self {
        Self {
            asset: asset.into(),
            date,
            quantity,
            operation_type,
        }
    }

    pub fn buy(asset: impl Into<String>, date: NaiveDate, quantity: Decimal) -> Self {
        Self::new(asset, date, quantity, OperationType::Buy)
    }

    pub fn sell(asset: impl Into<String>, date: NaiveDate, quantity: Decimal) -> Self {
        Self::new(asset, date, quantity, OperationType::Sell)
    }
}
