use serde::{Deserialize, Serialize};

use super::valuation::PortfolioValue;

/// Outcome of a sheet import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub assets_created: usize,
    pub prices_inserted: usize,
    /// Price rows skipped because (asset, date) already had a price
    pub prices_ignored: usize,
    pub weights_inserted: usize,
    /// `true` when the weights sheet was in percent and got divided by 100
    pub weights_were_percent: bool,
}

/// Outcome of the initial-quantity computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Outcome of a register-operations batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Number of operations recorded
    pub recorded: usize,
    /// Portfolio values rewritten after applying the batch
    pub revalued: Vec<PortfolioValue>,
}
