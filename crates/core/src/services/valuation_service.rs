use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::asset::AssetId;
use crate::models::ledger::Ledger;
use crate::models::portfolio::PortfolioId;
use crate::models::valuation::{
    AssetWeight, DateRange, PortfolioEvolution, PortfolioRef, ValuePoint, VizDefaults,
    WeightSnapshot,
};

/// Dashboard range used when no prices have been imported yet.
pub const DEFAULT_VIZ_START: (i32, u32, u32) = (2022, 2, 15);
pub const DEFAULT_VIZ_END: (i32, u32, u32) = (2023, 2, 16);

/// Per-date position values: `x_i,t = P_i,t × c_i` keyed by asset.
type PositionsByDate = BTreeMap<NaiveDate, HashMap<AssetId, Decimal>>;

/// Computes portfolio value `V_t` and weights `w_i,t` from holdings and prices.
///
/// Quantities are the current holdings applied to every historical date.
#[derive(Clone)]
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// `V_t` of a portfolio on `date`: sum of price × quantity over the
    /// holdings priced on that date. `None` if no holding has a price.
    pub fn value_at(
        &self,
        ledger: &Ledger,
        portfolio_id: PortfolioId,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, CoreError> {
        let mut total = Decimal::ZERO;
        let mut any_price = false;
        for holding in ledger.holdings_for(portfolio_id) {
            if let Some(price) = ledger.prices.get_price(holding.asset_id, date) {
                total = price
                    .checked_mul(holding.quantity)
                    .and_then(|x| total.checked_add(x))
                    .ok_or_else(|| out_of_range(date))?;
                any_price = true;
            }
        }
        Ok(any_price.then_some(total))
    }

    /// Value and weight time series of a portfolio over `[from, to]`.
    ///
    /// Only dates with at least one price for a held asset appear. On a
    /// date where `V_t` is zero every weight is reported as zero.
    pub fn evolution(
        &self,
        ledger: &Ledger,
        portfolio_id: PortfolioId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PortfolioEvolution, CoreError> {
        if from > to {
            return Err(CoreError::ValidationError(format!(
                "start date ({from}) must not be after end date ({to})"
            )));
        }

        let portfolio = ledger
            .portfolio_by_id(portfolio_id)
            .ok_or(CoreError::PortfolioNotFound(portfolio_id))?;

        let holdings = ledger.holdings_for(portfolio_id);
        if holdings.is_empty() {
            return Err(CoreError::MissingData(
                "No quantities (C_i,0) for this portfolio. Run init-quantities.".into(),
            ));
        }

        let positions = self.positions_by_date(ledger, portfolio_id, from, to)?;
        if positions.is_empty() {
            return Err(CoreError::MissingData(
                "No prices for the requested range.".into(),
            ));
        }

        let mut value_series = Vec::with_capacity(positions.len());
        let mut weights = Vec::with_capacity(positions.len());

        for (date, position_values) in &positions {
            let total = position_values
                .values()
                .try_fold(Decimal::ZERO, |acc, x| acc.checked_add(*x))
                .ok_or_else(|| out_of_range(*date))?;
            value_series.push(ValuePoint {
                date: *date,
                value: to_f64(total),
            });

            let mut w: Vec<AssetWeight> = position_values
                .iter()
                .map(|(asset_id, x)| AssetWeight {
                    asset: symbol_of(ledger, *asset_id),
                    value: if total.is_zero() { 0.0 } else { to_f64(*x / total) },
                })
                .collect();
            w.sort_by(|a, b| a.asset.cmp(&b.asset));
            weights.push(WeightSnapshot { date: *date, w });
        }

        debug!(
            portfolio_id,
            %from,
            %to,
            points = value_series.len(),
            "computed portfolio evolution"
        );

        Ok(PortfolioEvolution {
            portfolio: PortfolioRef {
                id: portfolio.id,
                name: portfolio.name.clone(),
            },
            range: DateRange { start: from, end: to },
            value_series,
            weights,
        })
    }

    /// Defaults for the dashboard form: first portfolio and the full price range.
    pub fn viz_defaults(&self, ledger: &Ledger) -> VizDefaults {
        let (sy, sm, sd) = DEFAULT_VIZ_START;
        let (ey, em, ed) = DEFAULT_VIZ_END;
        VizDefaults {
            pf_id: ledger.first_portfolio().map(|p| p.id).unwrap_or(1),
            fi: ledger
                .prices
                .earliest_date()
                .or_else(|| NaiveDate::from_ymd_opt(sy, sm, sd))
                .unwrap_or_default(),
            ff: ledger
                .prices
                .latest_date()
                .or_else(|| NaiveDate::from_ymd_opt(ey, em, ed))
                .unwrap_or_default(),
        }
    }

    /// Index `x_i,t` by date for every held asset priced within the range.
    fn positions_by_date(
        &self,
        ledger: &Ledger,
        portfolio_id: PortfolioId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PositionsByDate, CoreError> {
        let mut by_date = PositionsByDate::new();
        for holding in ledger.holdings_for(portfolio_id) {
            for point in ledger.prices.get_price_range(holding.asset_id, from, to) {
                let x = point
                    .price
                    .checked_mul(holding.quantity)
                    .ok_or_else(|| out_of_range(point.date))?;
                by_date.entry(point.date).or_default().insert(holding.asset_id, x);
            }
        }
        Ok(by_date)
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

fn symbol_of(ledger: &Ledger, asset_id: AssetId) -> String {
    ledger
        .asset_by_id(asset_id)
        .map(|a| a.symbol.clone())
        .unwrap_or_else(|| asset_id.to_string())
}

fn out_of_range(date: NaiveDate) -> CoreError {
    CoreError::ValidationError(format!("Portfolio value on {date} is out of range"))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
