//! Sheet import: asset prices and target weights from tabular input.
//!
//! Each sheet is a CSV table with a header row. The weights sheet holds one
//! row per asset with one numeric column per portfolio; the prices sheet
//! holds one row per date with one column per asset.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::report::ImportReport;
use crate::models::weight::Weight;
use crate::services::quantity_service::{default_t0, DEFAULT_PF1, DEFAULT_PF2};

/// Header names recognized as the asset column of the weights sheet.
const ASSET_COLUMN_NAMES: &[&str] = &["activos", "assets"];

/// Header names that are never taken as the asset column.
const DATE_ALIASES: &[&str] = &["fecha", "fechas", "date", "dates"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parameters of a sheet import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Date `t0` the imported weights are stored at
    pub start_date: NaiveDate,
    /// Portfolio receiving the first numeric weights column
    pub pf1: String,
    /// Portfolio receiving the second numeric weights column
    pub pf2: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            start_date: default_t0(),
            pf1: DEFAULT_PF1.to_string(),
            pf2: DEFAULT_PF2.to_string(),
        }
    }
}

/// A parsed sheet: trimmed headers and raw trimmed cells.
#[derive(Debug, Clone)]
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    fn read<R: Read>(reader: R, name: &str) -> Result<Self, CoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(CoreError::Import(format!("The {name} sheet has no header row.")));
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            if row.iter().all(String::is_empty) {
                continue;
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// A column is numeric when it has at least one value and every
    /// non-empty cell parses as a decimal.
    fn is_numeric_column(&self, col: usize) -> bool {
        let mut seen = false;
        for row in 0..self.rows.len() {
            let cell = self.cell(row, col);
            if cell.is_empty() {
                continue;
            }
            if parse_decimal(cell).is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }

    fn column_max(&self, col: usize) -> Option<Decimal> {
        (0..self.rows.len())
            .filter_map(|row| parse_decimal(self.cell(row, col)))
            .max()
    }
}

/// Weights sheet with its columns resolved.
struct WeightsLayout {
    asset_col: usize,
    pf1_col: usize,
    pf2_col: usize,
    divisor: Decimal,
}

/// Imports assets, prices and target weights into the ledger.
#[derive(Clone)]
pub struct ImportService;

impl ImportService {
    pub fn new() -> Self {
        Self
    }

    /// Import a weights sheet and a prices sheet.
    ///
    /// Assets are created from the price columns (and from unknown weight
    /// symbols) with the symbol as name. Prices and weights that already
    /// exist for the same key are left untouched. Atomic: on error the
    /// ledger is unchanged.
    pub fn import_sheets<W: Read, P: Read>(
        &self,
        ledger: &mut Ledger,
        weights_sheet: W,
        prices_sheet: P,
        options: &ImportOptions,
    ) -> Result<ImportReport, CoreError> {
        let weights = Sheet::read(weights_sheet, "weights")?;
        let prices = Sheet::read(prices_sheet, "prices")?;

        let layout = Self::resolve_weights_layout(&weights)?;
        let price_rows = Self::parse_price_rows(&prices)?;

        let mut scratch = ledger.clone();
        let mut report = ImportReport {
            weights_were_percent: layout.divisor != Decimal::ONE,
            ..ImportReport::default()
        };

        let pf1 = scratch.get_or_create_portfolio(&options.pf1);
        let pf2 = scratch.get_or_create_portfolio(&options.pf2);

        // Assets come from the price columns
        let mut column_assets = Vec::with_capacity(prices.headers.len().saturating_sub(1));
        for symbol in &prices.headers[1..] {
            if symbol.is_empty() {
                column_assets.push(None);
                continue;
            }
            let (asset_id, created) = scratch.get_or_create_asset(symbol, symbol);
            if created {
                report.assets_created += 1;
            }
            column_assets.push(Some(asset_id));
        }

        for (date, row) in &price_rows {
            for (offset, asset_id) in column_assets.iter().enumerate() {
                let Some(asset_id) = asset_id else {
                    continue;
                };
                let Some(price) = row.get(offset + 1).and_then(|c| parse_decimal(c)) else {
                    continue;
                };
                if scratch.prices.insert_if_absent(*asset_id, *date, price) {
                    report.prices_inserted += 1;
                } else {
                    report.prices_ignored += 1;
                }
            }
        }

        for row in 0..weights.rows.len() {
            let symbol = weights.cell(row, layout.asset_col);
            if symbol.is_empty() {
                continue;
            }
            let (asset_id, created) = scratch.get_or_create_asset(symbol, symbol);
            if created {
                report.assets_created += 1;
            }

            for (portfolio_id, col) in [(pf1, layout.pf1_col), (pf2, layout.pf2_col)] {
                let Some(raw) = parse_decimal(weights.cell(row, col)) else {
                    continue;
                };
                let weight = Weight::new(portfolio_id, asset_id, options.start_date, raw / layout.divisor);
                if scratch.insert_weight_if_absent(weight) {
                    report.weights_inserted += 1;
                }
            }
        }

        *ledger = scratch;
        info!(
            assets_created = report.assets_created,
            prices_inserted = report.prices_inserted,
            weights_inserted = report.weights_inserted,
            percent = report.weights_were_percent,
            "sheet import completed"
        );
        Ok(report)
    }

    /// File-path variant of [`import_sheets`](Self::import_sheets).
    pub fn import_sheet_files(
        &self,
        ledger: &mut Ledger,
        weights_path: &Path,
        prices_path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, CoreError> {
        let weights = std::fs::File::open(weights_path).map_err(|e| {
            CoreError::Import(format!("Could not open {}: {e}", weights_path.display()))
        })?;
        let prices = std::fs::File::open(prices_path).map_err(|e| {
            CoreError::Import(format!("Could not open {}: {e}", prices_path.display()))
        })?;
        self.import_sheets(ledger, weights, prices, options)
    }

    /// Find the asset and the two portfolio columns, and whether weights are percentages.
    fn resolve_weights_layout(sheet: &Sheet) -> Result<WeightsLayout, CoreError> {
        let numeric: Vec<usize> = (0..sheet.headers.len())
            .filter(|&col| sheet.is_numeric_column(col))
            .collect();
        if numeric.len() < 2 {
            return Err(CoreError::Import(
                "The weights sheet needs at least two numeric columns (pf1/pf2).".into(),
            ));
        }
        let (pf1_col, pf2_col) = (numeric[0], numeric[1]);

        let by_name = sheet
            .headers
            .iter()
            .position(|h| ASSET_COLUMN_NAMES.contains(&h.to_lowercase().as_str()));
        let asset_col = match by_name {
            Some(col) => col,
            None => (0..sheet.headers.len())
                .filter(|col| !numeric.contains(col))
                .find(|&col| !DATE_ALIASES.contains(&sheet.headers[col].to_lowercase().as_str()))
                .ok_or_else(|| {
                    CoreError::Import("No asset identifier column found in the weights sheet.".into())
                })?,
        };

        let one = Decimal::ONE;
        let is_percent = [pf1_col, pf2_col]
            .iter()
            .any(|&col| sheet.column_max(col).is_some_and(|max| max > one));
        let divisor = if is_percent { Decimal::ONE_HUNDRED } else { one };

        debug!(
            asset_column = %sheet.headers[asset_col],
            pf1_column = %sheet.headers[pf1_col],
            pf2_column = %sheet.headers[pf2_col],
            is_percent,
            "resolved weights sheet layout"
        );

        Ok(WeightsLayout {
            asset_col,
            pf1_col,
            pf2_col,
            divisor,
        })
    }

    /// Parse the date column of the prices sheet; rows without a date are dropped.
    fn parse_price_rows(sheet: &Sheet) -> Result<Vec<(NaiveDate, &Vec<String>)>, CoreError> {
        if sheet.headers.len() < 2 {
            return Err(CoreError::Import(
                "The prices sheet must have asset columns.".into(),
            ));
        }

        let mut rows = Vec::with_capacity(sheet.rows.len());
        for (idx, row) in sheet.rows.iter().enumerate() {
            let cell = sheet.cell(idx, 0);
            if cell.is_empty() {
                continue;
            }
            let date = parse_date(cell).ok_or_else(|| {
                CoreError::Import(format!(
                    "The first column of the prices sheet must be a valid date (row {}: '{cell}').",
                    idx + 2
                ))
            })?;
            rows.push((date, row));
        }
        Ok(rows)
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a sheet cell as a decimal, accepting scientific notation.
pub fn parse_decimal(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

/// Parse a sheet cell as a date in any of the accepted layouts.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
}
