pub mod asset;
pub mod holding;
pub mod ledger;
pub mod operation;
pub mod portfolio;
pub mod price;
pub mod report;
pub mod valuation;
pub mod weight;
