//! Folding tax breakdowns over collections of line items.

mod event;
mod report;

pub use event::{CategoryTotal, EventSummary};
pub use report::{Period, PeriodReport, ReportTotals};

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaxError;
use crate::tax::{checked_sum, Taxable, TaxBreakdown};

/// Sums over a set of taxable items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTotals {
    /// Σ entered amount.
    pub total_amount: Decimal,
    /// Σ VAT.
    pub total_vat: Decimal,
    /// Σ withholding tax.
    pub total_wht: Decimal,
    /// Σ net payable.
    pub total_net: Decimal,
    /// Number of items folded in.
    pub item_count: usize,
}

impl TaxTotals {
    /// Fold one item's entered amount and breakdown.
    ///
    /// Leaves `self` untouched when a sum would overflow.
    pub fn add(&mut self, amount: Decimal, tax: &TaxBreakdown) -> Result<(), TaxError> {
        self.merge(&Self {
            total_amount: amount,
            total_vat: tax.vat_amount,
            total_wht: tax.wht_amount,
            total_net: tax.net_payable,
            item_count: 1,
        })
    }

    /// Fold another set of totals into this one.
    pub fn merge(&mut self, other: &Self) -> Result<(), TaxError> {
        *self = Self {
            total_amount: checked_sum(self.total_amount, other.total_amount)?,
            total_vat: checked_sum(self.total_vat, other.total_vat)?,
            total_wht: checked_sum(self.total_wht, other.total_wht)?,
            total_net: checked_sum(self.total_net, other.total_net)?,
            item_count: self.item_count + other.item_count,
        };
        Ok(())
    }
}

/// Compute each item's breakdown once and fold the results.
pub fn aggregate<'a, T, I>(items: I) -> Result<TaxTotals, TaxError>
where
    T: Taxable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut totals = TaxTotals::default();
    for item in items {
        let input = item.taxable()?;
        let tax = input.compute()?;
        totals.add(input.amount, &tax)?;
    }
    Ok(totals)
}

/// Partition items by `key`, then fold within each group.
pub fn aggregate_by<'a, T, I, K, F>(items: I, key: F) -> Result<BTreeMap<K, TaxTotals>, TaxError>
where
    T: Taxable + 'a,
    I: IntoIterator<Item = &'a T>,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, TaxTotals> = BTreeMap::new();
    for item in items {
        let input = item.taxable()?;
        let tax = input.compute()?;
        groups.entry(key(item)).or_default().add(input.amount, &tax)?;
    }
    debug!("Aggregated items into {} groups", groups.len());
    Ok(groups)
}

/// `numerator / denominator × 100`, or zero when the denominator is not positive.
pub fn percent_of(numerator: Decimal, denominator: Decimal) -> Result<Decimal, TaxError> {
    if denominator <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(TaxError::AmountTooLarge(numerator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostItem;
    use crate::tax::VatMode;
    use pretty_assertions::assert_eq;

    fn item(category: &str, amount: i64, mode: VatMode, wht: i64) -> CostItem {
        CostItem::new(category, "", Decimal::from(amount)).with_tax(mode, Decimal::from(wht))
    }

    #[test]
    fn test_aggregate_mixed_items() {
        let items = vec![
            item("staff", 100, VatMode::None, 0),
            item("travel", 200, VatMode::Excluded, 5),
        ];

        let totals = aggregate(&items).unwrap();
        assert_eq!(totals.total_amount, Decimal::from(300));
        assert_eq!(totals.total_vat, Decimal::from(14));
        assert_eq!(totals.total_wht, Decimal::from(10));
        assert_eq!(totals.total_net, Decimal::from(304));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let mut items = vec![
            item("staff", 1500, VatMode::Included, 3),
            item("venue", 8000, VatMode::Excluded, 5),
            item("food", 640, VatMode::None, 0),
        ];
        let forward = aggregate(&items).unwrap();
        items.reverse();
        let backward = aggregate(&items).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_aggregate_empty() {
        let items: Vec<CostItem> = Vec::new();
        assert_eq!(aggregate(&items).unwrap(), TaxTotals::default());
    }

    #[test]
    fn test_aggregate_by_category_partitions() {
        let items = vec![
            item("staff", 1000, VatMode::None, 3),
            item("travel", 200, VatMode::Excluded, 0),
            item("staff", 500, VatMode::None, 3),
        ];

        let groups = aggregate_by(&items, |i| i.category.clone()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["staff"].total_amount, Decimal::from(1500));
        assert_eq!(groups["staff"].total_wht, Decimal::from(45));
        assert_eq!(groups["travel"].total_vat, Decimal::from(14));

        let mut merged = TaxTotals::default();
        for totals in groups.values() {
            merged.merge(totals).unwrap();
        }
        assert_eq!(merged, aggregate(&items).unwrap());
    }

    #[test]
    fn test_aggregate_propagates_bad_rows() {
        let mut bad = item("staff", 100, VatMode::None, 0);
        bad.vat_mode = Some("half".to_string());
        let items = vec![bad];
        assert!(matches!(aggregate(&items), Err(TaxError::UnknownVatMode(_))));
    }

    #[test]
    fn test_aggregate_overflow_is_an_error() {
        let half = Decimal::MAX / Decimal::TWO + Decimal::ONE;
        let items = vec![
            CostItem::new("venue", "", half),
            CostItem::new("venue", "", half),
        ];
        assert!(matches!(aggregate(&items), Err(TaxError::AmountTooLarge(_))));
        assert!(matches!(
            aggregate_by(&items, |i| i.category.clone()),
            Err(TaxError::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_failed_merge_leaves_totals_untouched() {
        let items = vec![item("staff", 100, VatMode::None, 0)];
        let mut totals = aggregate(&items).unwrap();
        let before = totals;
        let huge = TaxTotals {
            total_amount: Decimal::MAX,
            ..TaxTotals::default()
        };
        assert!(totals.merge(&huge).is_err());
        assert_eq!(totals, before);
    }

    #[test]
    fn test_percent_of_guards_zero() {
        assert_eq!(percent_of(Decimal::from(5), Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(percent_of(Decimal::from(5), Decimal::from(-10)), Ok(Decimal::ZERO));
        assert_eq!(percent_of(Decimal::from(25), Decimal::from(200)), Ok(Decimal::new(125, 1)));
        assert!(percent_of(Decimal::MAX, Decimal::new(1, 2)).is_err());
    }
}
