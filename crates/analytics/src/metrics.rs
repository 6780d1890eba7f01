//! Pure metric formulas.
//!
//! Every function is total: an input that is missing, or that would make the metric
//! meaningless (a zero denominator, a loss-making EPS, negative equity), yields `None`.
//! Arithmetic is checked, so an overflow is reported the same way instead of panicking.

use crate::period::{SelectedPeriods, TTM_QUARTERS};
use rust_decimal::Decimal;

/// Price-to-earnings ratio: `price / (net_income / shares_outstanding)`.
///
/// `None` when any input is absent, shares outstanding is zero, or EPS is not positive.
pub fn pe_ratio(
    price: Option<Decimal>,
    net_income: Option<Decimal>,
    shares_outstanding: Option<Decimal>,
) -> Option<Decimal> {
    let price = price?;
    let eps = net_income?.checked_div(shares_outstanding?)?;
    if eps <= Decimal::ZERO {
        return None;
    }
    price.checked_div(eps)
}

/// Quarter-over-quarter revenue growth: `(latest - previous) / previous`.
///
/// `None` when either revenue is absent or the previous revenue is zero.
pub fn revenue_growth(latest: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    let (latest, previous) = (latest?, previous?);
    if previous.is_zero() {
        return None;
    }
    latest.checked_sub(previous)?.checked_div(previous)
}

/// Trailing twelve month net income: the sum over exactly four quarters.
///
/// Any other window length, or a single missing quarter, gives `None`. A partial sum is
/// never returned.
pub fn net_income_ttm(quarterly_net_income: &[Option<Decimal>]) -> Option<Decimal> {
    if quarterly_net_income.len() != TTM_QUARTERS {
        return None;
    }
    quarterly_net_income
        .iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add((*value)?))
}

/// Debt ratio: `total_debt / total_equity`. `None` when equity is not positive.
pub fn debt_ratio(total_debt: Option<Decimal>, total_equity: Option<Decimal>) -> Option<Decimal> {
    let (debt, equity) = (total_debt?, total_equity?);
    if equity <= Decimal::ZERO {
        return None;
    }
    debt.checked_div(equity)
}

/// The four metrics derived from one ticker's selected periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculatedMetrics {
    pub pe_ratio: Option<Decimal>,
    pub revenue_growth: Option<Decimal>,
    pub net_income_ttm: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
}

/// Applies every formula to the periods picked by [`crate::period::select_periods`].
pub fn calculate(selected: &SelectedPeriods<'_>) -> CalculatedMetrics {
    let latest = selected.latest_quarter;
    let previous = selected.previous_quarter;

    let ttm_inputs: Option<Vec<Option<Decimal>>> = selected
        .trailing_quarters
        .map(|window| window.iter().map(|s| s.net_income).collect());

    CalculatedMetrics {
        pe_ratio: latest.and_then(|q| pe_ratio(q.price, q.net_income, q.shares_outstanding)),
        revenue_growth: revenue_growth(
            latest.and_then(|q| q.revenue),
            previous.and_then(|q| q.revenue),
        ),
        net_income_ttm: ttm_inputs.as_deref().and_then(net_income_ttm),
        debt_ratio: selected
            .latest_fiscal_year
            .and_then(|fy| debt_ratio(fy.total_debt, fy.total_equity)),
    }
}
