//! Profit and margin for a single job event.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;
use crate::models::JobEvent;
use crate::tax::{Taxable, TaxBreakdown};

use super::{aggregate, aggregate_by, percent_of, TaxTotals};

/// Raw cost amount spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Financial summary of a job event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_name: String,

    /// Selling price as entered.
    pub revenue: Decimal,

    /// Revenue-side breakdown; `net_payable` is the net receivable.
    pub revenue_tax: TaxBreakdown,

    /// Cost-side totals over all line items.
    pub costs: TaxTotals,

    /// `revenue net receivable - raw cost sum`.
    pub profit: Decimal,

    /// Profit as a percentage of net receivable; zero without revenue.
    pub margin_percent: Decimal,

    /// Output VAT minus input VAT.
    pub net_vat_payable: Decimal,

    /// Share of revenue eaten by costs, capped at 100.
    pub cost_share_percent: Decimal,

    /// Share of revenue left after costs, floored at 0.
    pub profit_share_percent: Decimal,

    /// Raw cost per category, largest first.
    pub categories: Vec<CategoryTotal>,
}

impl EventSummary {
    /// Summarize an event: revenue taxed once, each cost line taxed once.
    pub fn compute(event: &JobEvent) -> Result<Self, TaxError> {
        let revenue_tax = event.tax()?;
        let costs = aggregate(&event.cost_items)?;

        let net_receivable = revenue_tax.net_receivable();
        let total_cost = costs.total_amount;
        let profit = net_receivable - total_cost;

        let categories = sorted_categories(
            aggregate_by(&event.cost_items, |i| i.category.clone())?
                .into_iter()
                .map(|(category, totals)| (category, totals.total_amount)),
        );

        Ok(Self {
            event_name: event.event_name.clone(),
            revenue: event.revenue,
            revenue_tax,
            costs,
            profit,
            margin_percent: percent_of(profit, net_receivable)?,
            net_vat_payable: revenue_tax.vat_amount - costs.total_vat,
            cost_share_percent: percent_of(total_cost, event.revenue)?.min(Decimal::ONE_HUNDRED),
            profit_share_percent: percent_of(event.revenue - total_cost, event.revenue)?
                .max(Decimal::ZERO),
            categories,
        })
    }

    pub fn total_cost(&self) -> Decimal {
        self.costs.total_amount
    }

    pub fn is_profitable(&self) -> bool {
        self.profit >= Decimal::ZERO
    }
}

/// Order category totals by amount, largest first; ties by key.
pub(crate) fn sorted_categories<I>(totals: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = (String, Decimal)>,
{
    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    categories.sort_by(|a, b| match b.amount.cmp(&a.amount) {
        Ordering::Equal => a.category.cmp(&b.category),
        other => other,
    });
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostItem;
    use crate::tax::VatMode;
    use pretty_assertions::assert_eq;

    fn event() -> JobEvent {
        let mut event = JobEvent::new("Corporate party", Decimal::from(10000));
        event.revenue_vat_mode = Some("excluded".to_string());
        event.revenue_wht_rate = Decimal::from(3);
        event.cost_items = vec![
            CostItem::new("staff", "Crew", Decimal::from(2000)),
            CostItem::new("travel", "Fuel", Decimal::from(500))
                .with_tax(VatMode::Excluded, Decimal::ZERO),
            CostItem::new("staff", "Photographer", Decimal::from(1500))
                .with_tax(VatMode::None, Decimal::from(3)),
        ];
        event
    }

    #[test]
    fn test_event_summary() {
        let summary = EventSummary::compute(&event()).unwrap();

        assert_eq!(summary.revenue_tax.net_receivable(), Decimal::from(10400));
        assert_eq!(summary.total_cost(), Decimal::from(4000));
        assert_eq!(summary.profit, Decimal::from(6400));
        assert!(summary.is_profitable());
        assert_eq!(
            summary.margin_percent.round_dp(4),
            Decimal::new(615385, 4)
        );
        assert_eq!(summary.costs.total_vat, Decimal::from(35));
        assert_eq!(summary.costs.total_wht, Decimal::from(45));
        assert_eq!(summary.net_vat_payable, Decimal::from(665));
        assert_eq!(summary.cost_share_percent, Decimal::from(40));
        assert_eq!(summary.profit_share_percent, Decimal::from(60));
        assert_eq!(
            summary.categories,
            vec![
                CategoryTotal { category: "staff".to_string(), amount: Decimal::from(3500) },
                CategoryTotal { category: "travel".to_string(), amount: Decimal::from(500) },
            ]
        );
    }

    #[test]
    fn test_margin_zero_without_revenue() {
        let mut event = event();
        event.revenue = Decimal::ZERO;

        let summary = EventSummary::compute(&event).unwrap();
        assert_eq!(summary.margin_percent, Decimal::ZERO);
        assert_eq!(summary.cost_share_percent, Decimal::ZERO);
        assert_eq!(summary.profit_share_percent, Decimal::ZERO);
        assert_eq!(summary.profit, Decimal::from(-4000));
        assert!(!summary.is_profitable());
    }

    #[test]
    fn test_cost_share_capped() {
        let mut event = JobEvent::new("Loss leader", Decimal::from(1000));
        event.cost_items = vec![CostItem::new("venue", "Hall", Decimal::from(2500))];

        let summary = EventSummary::compute(&event).unwrap();
        assert_eq!(summary.cost_share_percent, Decimal::from(100));
        assert_eq!(summary.profit_share_percent, Decimal::ZERO);
        assert_eq!(summary.margin_percent, Decimal::from(-150));
    }

    #[test]
    fn test_category_ties_sorted_by_key() {
        let sorted = sorted_categories(vec![
            ("venue".to_string(), Decimal::from(100)),
            ("food".to_string(), Decimal::from(100)),
            ("staff".to_string(), Decimal::from(300)),
        ]);
        let keys: Vec<&str> = sorted.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(keys, vec!["staff", "food", "venue"]);
    }
}
