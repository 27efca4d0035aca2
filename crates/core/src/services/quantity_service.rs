use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::report::SeedReport;
use crate::models::valuation::PortfolioValue;

/// Default start date `t0` shared by the import and seeding routines.
pub const DEFAULT_T0: (i32, u32, u32) = (2022, 2, 15);

/// Default initial portfolio value `V0`.
pub const DEFAULT_V0: i64 = 1_000_000_000;

pub const DEFAULT_PF1: &str = "Portfolio 1";
pub const DEFAULT_PF2: &str = "Portfolio 2";

pub(crate) fn default_t0() -> NaiveDate {
    let (y, m, d) = DEFAULT_T0;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Parameters of the initial-quantity computation.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub t0: NaiveDate,
    pub v0: Decimal,
    pub pf1: String,
    pub pf2: String,
    /// Replace quantities that already exist instead of skipping them
    pub overwrite: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            t0: default_t0(),
            v0: Decimal::from(DEFAULT_V0),
            pf1: DEFAULT_PF1.to_string(),
            pf2: DEFAULT_PF2.to_string(),
            overwrite: false,
        }
    }
}

/// Derives initial holdings from target weights:
/// `C_i,0 = w_i,0 × V0 / P_i,0`.
#[derive(Clone)]
pub struct QuantityService;

impl QuantityService {
    pub fn new() -> Self {
        Self
    }

    /// Compute `C_i,0` for every weight dated `t0` and store it as the
    /// holding of (portfolio, asset). Also records `V0` as the value of
    /// both named portfolios at `t0`.
    ///
    /// Weights without a price (or with a zero price) on `t0` are skipped.
    /// Existing holdings are kept unless `overwrite` is set. Atomic: on
    /// error the ledger is unchanged.
    pub fn seed_initial_quantities(
        &self,
        ledger: &mut Ledger,
        options: &SeedOptions,
    ) -> Result<SeedReport, CoreError> {
        let t0 = options.t0;
        let mut scratch = ledger.clone();

        let portfolio_ids = [
            scratch.get_or_create_portfolio(&options.pf1),
            scratch.get_or_create_portfolio(&options.pf2),
        ];

        let weights: Vec<_> = scratch.weights_on(t0).into_iter().cloned().collect();
        if weights.is_empty() {
            return Err(CoreError::MissingData(format!(
                "No weights at t0={t0}. Import the sheets first."
            )));
        }

        let prices = scratch.prices.prices_on(t0);
        if prices.is_empty() {
            return Err(CoreError::MissingData(format!("No prices at t0={t0}.")));
        }

        let mut report = SeedReport::default();

        for weight in &weights {
            let price = match prices.get(&weight.asset_id) {
                Some(p) if !p.is_zero() => *p,
                _ => {
                    warn!(asset_id = weight.asset_id, %t0, "no usable price at t0, skipping weight");
                    report.skipped += 1;
                    continue;
                }
            };

            let quantity = weight
                .weight
                .checked_mul(options.v0)
                .and_then(|target| target.checked_div(price))
                .ok_or_else(|| {
                    CoreError::ValidationError(format!(
                        "Initial quantity of asset {} is out of range (V0={})",
                        weight.asset_id, options.v0
                    ))
                })?;

            let exists = scratch.holding(weight.portfolio_id, weight.asset_id).is_some();
            match (exists, options.overwrite) {
                (true, false) => report.skipped += 1,
                (true, true) => {
                    scratch.upsert_holding(weight.portfolio_id, weight.asset_id, quantity);
                    report.updated += 1;
                }
                (false, _) => {
                    scratch.upsert_holding(weight.portfolio_id, weight.asset_id, quantity);
                    report.created += 1;
                }
            }
            debug!(
                portfolio_id = weight.portfolio_id,
                asset_id = weight.asset_id,
                %quantity,
                "initial quantity"
            );
        }

        for portfolio_id in portfolio_ids {
            scratch.upsert_portfolio_value(PortfolioValue::new(portfolio_id, t0, options.v0));
        }

        *ledger = scratch;
        info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            "initial quantities computed"
        );
        Ok(report)
    }
}

impl Default for QuantityService {
    fn default() -> Self {
        Self::new()
    }
}
