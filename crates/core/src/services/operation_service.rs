use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::operation::{Operation, OperationRequest, OperationType};
use crate::models::portfolio::PortfolioId;
use crate::models::report::OperationOutcome;
use crate::models::valuation::PortfolioValue;
use crate::services::valuation_service::ValuationService;

/// Records buy/sell operations and keeps holdings and portfolio values in step.
///
/// Pure business logic — no I/O. Easy to test.
#[derive(Clone)]
pub struct OperationService {
    valuation_service: ValuationService,
}

impl OperationService {
    pub fn new() -> Self {
        Self {
            valuation_service: ValuationService::new(),
        }
    }

    /// Record a batch of operations for one portfolio.
    ///
    /// All requests are validated and applied to a scratch copy of the
    /// ledger first; the ledger is only replaced if every request succeeds
    /// (all-or-nothing). Afterwards `V_t` is recomputed and stored for each
    /// distinct operation date that has prices.
    pub fn register_operations(
        &self,
        ledger: &mut Ledger,
        portfolio_id: PortfolioId,
        requests: &[OperationRequest],
    ) -> Result<OperationOutcome, CoreError> {
        if ledger.portfolio_by_id(portfolio_id).is_none() {
            return Err(CoreError::PortfolioNotFound(portfolio_id));
        }

        let mut scratch = ledger.clone();
        let mut dates = BTreeSet::new();

        for request in requests {
            let operation = self.apply(&mut scratch, portfolio_id, request)?;
            dates.insert(operation.date);
            scratch.push_operation(operation);
        }

        let revalued = self.revalue(&mut scratch, portfolio_id, &dates)?;

        *ledger = scratch;
        info!(
            portfolio_id,
            recorded = requests.len(),
            revalued = revalued.len(),
            "operations registered"
        );

        Ok(OperationOutcome {
            recorded: requests.len(),
            revalued,
        })
    }

    /// Validate one request and fold it into the holding.
    ///
    /// Rules:
    /// - Asset must exist
    /// - Quantity must be positive
    /// - Can't sell more than the portfolio currently holds
    fn apply(
        &self,
        ledger: &mut Ledger,
        portfolio_id: PortfolioId,
        request: &OperationRequest,
    ) -> Result<Operation, CoreError> {
        let asset = ledger
            .asset_by_symbol(&request.asset)
            .ok_or_else(|| CoreError::AssetNotFound(request.asset.clone()))?;
        let asset_id = asset.id;
        let symbol = asset.symbol.clone();

        if request.quantity <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Operation quantity must be positive (got {} for {})",
                request.quantity, symbol
            )));
        }

        let held = ledger
            .holding(portfolio_id, asset_id)
            .map(|h| h.quantity)
            .unwrap_or(Decimal::ZERO);

        if request.operation_type == OperationType::Sell && held < request.quantity {
            return Err(CoreError::ValidationError(format!(
                "Cannot sell {} {}: the portfolio only holds {}",
                request.quantity, symbol, held
            )));
        }

        let operation = Operation::new(
            portfolio_id,
            asset_id,
            request.date,
            request.quantity,
            request.operation_type,
        );
        let quantity = held.checked_add(operation.signed_quantity()).ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Quantity of {symbol} is out of range after this operation"
            ))
        })?;
        ledger.upsert_holding(portfolio_id, asset_id, quantity);

        debug!(
            portfolio_id,
            asset = %symbol,
            kind = %request.operation_type,
            quantity = %request.quantity,
            "applied operation"
        );
        Ok(operation)
    }

    /// Recompute and store `V_t` for each date that has at least one price.
    fn revalue(
        &self,
        ledger: &mut Ledger,
        portfolio_id: PortfolioId,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<PortfolioValue>, CoreError> {
        let mut revalued = Vec::new();
        for &date in dates {
            if let Some(total) = self.valuation_service.value_at(ledger, portfolio_id, date)? {
                let value = PortfolioValue::new(portfolio_id, date, total);
                ledger.upsert_portfolio_value(value.clone());
                revalued.push(value);
            }
        }
        Ok(revalued)
    }
}

impl Default for OperationService {
    fn default() -> Self {
        Self::new()
    }
}
