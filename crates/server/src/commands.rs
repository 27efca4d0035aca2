//! Batch commands run from the CLI: sheet import and initial quantities.

use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

use portfolio_tracker_core::models::report::{ImportReport, SeedReport};
use portfolio_tracker_core::services::import_service::ImportOptions;
use portfolio_tracker_core::services::quantity_service::SeedOptions;
use portfolio_tracker_core::PortfolioTracker;

use crate::handlers::StoreTarget;

/// Parse the `--t0` / `--start-date` argument.
pub fn parse_t0(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid --t0 '{value}'. Use the YYYY-MM-DD format."))
}

/// Parse the `--v0` argument (integer or decimal).
pub fn parse_v0(value: &str) -> anyhow::Result<Decimal> {
    let v0 = Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .map_err(|_| anyhow!("Invalid --v0 '{value}'."))?;
    if v0 <= Decimal::ZERO {
        return Err(anyhow!("Invalid --v0 '{value}': must be positive."));
    }
    Ok(v0)
}

/// Import the weights and prices sheets into the store file.
pub fn run_import(
    store: &StoreTarget,
    weights: &Path,
    prices: &Path,
    options: &ImportOptions,
) -> anyhow::Result<ImportReport> {
    let mut tracker = open(store)?;
    let report = tracker.import_sheet_files(weights, prices, options)?;
    save(&mut tracker, store)?;
    Ok(report)
}

/// Compute initial quantities and save them to the store file.
pub fn run_init_quantities(store: &StoreTarget, options: &SeedOptions) -> anyhow::Result<SeedReport> {
    let mut tracker = open(store)?;
    let report = tracker.seed_initial_quantities(options)?;
    save(&mut tracker, store)?;
    Ok(report)
}

/// One-line summary printed after an import.
pub fn import_summary(report: &ImportReport) -> String {
    let scale = if report.weights_were_percent {
        " (weights normalized from %)"
    } else {
        ""
    };
    format!(
        "Import completed successfully{scale}: {} assets created, {} prices inserted, {} prices already present, {} weights inserted.",
        report.assets_created, report.prices_inserted, report.prices_ignored, report.weights_inserted
    )
}

/// One-line summary printed after seeding quantities.
pub fn seed_summary(report: &SeedReport) -> String {
    format!(
        "Done. Quantities created: {}, updated: {}, skipped: {}.",
        report.created, report.updated, report.skipped
    )
}

fn open(store: &StoreTarget) -> anyhow::Result<PortfolioTracker> {
    PortfolioTracker::open_or_create(&store.path, &store.password)
        .with_context(|| format!("failed to open store {}", store.path.display()))
}

fn save(tracker: &mut PortfolioTracker, store: &StoreTarget) -> anyhow::Result<()> {
    tracker
        .save_to_file(&store.path, &store.password)
        .with_context(|| format!("failed to save store {}", store.path.display()))?;
    info!(path = %store.path.display(), "store saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t0_accepts_iso_dates() {
        assert_eq!(
            parse_t0("2022-02-15").unwrap(),
            NaiveDate::from_ymd_opt(2022, 2, 15).unwrap()
        );
    }

    #[test]
    fn t0_rejects_other_formats() {
        let err = parse_t0("15/02/2022").unwrap_err();
        assert!(err.to_string().contains("Invalid --t0"));
    }

    #[test]
    fn v0_accepts_integers_and_decimals() {
        assert_eq!(parse_v0("1000000000").unwrap(), Decimal::from(1_000_000_000));
        assert_eq!(parse_v0("2500.50").unwrap(), Decimal::new(250050, 2));
        assert_eq!(parse_v0("1e6").unwrap(), Decimal::from(1_000_000));
    }

    #[test]
    fn v0_rejects_garbage_and_non_positive() {
        assert!(parse_v0("abc").is_err());
        assert!(parse_v0("0").is_err());
        assert!(parse_v0("-5").is_err());
    }

    #[test]
    fn summaries_mention_counts() {
        let seed = seed_summary(&SeedReport {
            created: 3,
            updated: 1,
            skipped: 2,
        });
        assert_eq!(seed, "Done. Quantities created: 3, updated: 1, skipped: 2.");

        let import = import_summary(&ImportReport {
            assets_created: 2,
            prices_inserted: 10,
            prices_ignored: 0,
            weights_inserted: 4,
            weights_were_percent: true,
        });
        assert!(import.contains("normalized from %"));
        assert!(import.contains("10 prices inserted"));
    }
}
