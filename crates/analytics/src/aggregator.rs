use core_types::{IndustryAggregate, TickerMetrics};
use rust_decimal::Decimal;
use tracing::warn;

/// A stateless calculator that rolls ticker metrics up into industry statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndustryAggregator;

impl IndustryAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregates the records of one industry.
    ///
    /// Each statistic only considers the tickers that have a value for it, and records
    /// which belong to a different industry are ignored. The result depends on nothing
    /// but `metrics`, so running it twice over the same set gives the same aggregate.
    pub fn aggregate(&self, industry: &str, metrics: &[TickerMetrics]) -> IndustryAggregate {
        let members: Vec<&TickerMetrics> = metrics
            .iter()
            .filter(|m| {
                let belongs = m.industry == industry;
                if !belongs {
                    warn!(
                        ticker = %m.ticker,
                        expected = industry,
                        actual = %m.industry,
                        "ignoring ticker metrics from another industry"
                    );
                }
                belongs
            })
            .collect();

        let pe = present(members.iter().map(|m| m.pe_ratio));
        let growth = present(members.iter().map(|m| m.revenue_growth));
        let revenue = present(members.iter().map(|m| m.latest_quarter_revenue));

        IndustryAggregate {
            industry: industry.to_string(),
            avg_pe_ratio: mean(&pe),
            pe_ratio_count: pe.len(),
            avg_revenue_growth: mean(&growth),
            revenue_growth_count: growth.len(),
            sum_revenue: sum(&revenue),
            revenue_count: revenue.len(),
            ticker_count: members.len(),
        }
    }
}

fn present(values: impl Iterator<Item = Option<Decimal>>) -> Vec<Decimal> {
    values.flatten().collect()
}

/// `None` for an empty slice, or if the sum overflows.
fn sum(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    values
        .iter()
        .try_fold(Decimal::ZERO, |total, v| total.checked_add(*v))
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    sum(values)?.checked_div(Decimal::from(values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_slices_have_no_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sum(&[]), None);
        assert_eq!(mean(&[dec!(1), dec!(2)]), Some(dec!(1.5)));
    }
}
