use serde::{Deserialize, Serialize};

/// Identifier of an asset inside a [`Ledger`](super::ledger::Ledger).
pub type AssetId = u32;

/// A tradable asset, identified by its ticker symbol.
///
/// **Equality and hashing** are based solely on `symbol`, NOT on `name`
/// or `id`, so lookups work the same whether the asset came from a sheet
/// header or from an operation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,

    /// Ticker symbol, trimmed (e.g., "AAPL", "BONO-2030")
    pub symbol: String,

    /// Human-readable name. Sheet imports use the symbol as name.
    pub name: String,
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Asset {}

impl std::hash::Hash for Asset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Asset {
    pub fn new(id: AssetId, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into().trim().to_string(),
            name: name.into(),
        }
    }
}
