use serde::{Deserialize, Serialize};

/// Identifier of a portfolio inside a [`Ledger`](super::ledger::Ledger).
pub type PortfolioId = u32;

/// A named portfolio. Holdings, weights and operations refer to it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub name: String,
}

impl Portfolio {
    pub fn new(id: PortfolioId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
