//! Job costing records: job events and their cost line items.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;
use crate::money::de_or_zero;
use crate::tax::{resolve_vat_mode, Taxable, TaxableAmount, VatMode};

/// A single cost line item of a job event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_event_id: Option<String>,

    /// Cost category key (see [`crate::categories::CategoryRegistry`]).
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub description: String,

    /// Entered amount; VAT relationship given by `vat_mode`.
    #[serde(default, deserialize_with = "de_or_zero")]
    pub amount: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// `none`, `included` or `excluded`. Older rows leave this empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_mode: Option<String>,

    /// Legacy flag predating `vat_mode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_vat: Option<bool>,

    /// Withholding-tax rate in percent.
    #[serde(default, deserialize_with = "de_or_zero")]
    pub withholding_tax_rate: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub(crate) fn default_category() -> String {
    "other".to_string()
}

impl CostItem {
    /// Create a cost item in the given category.
    pub fn new(category: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: None,
            job_event_id: None,
            category: category.into(),
            description: description.into(),
            amount,
            unit_price: None,
            quantity: None,
            unit: None,
            vat_mode: None,
            include_vat: None,
            withholding_tax_rate: Decimal::ZERO,
            notes: None,
        }
    }

    /// Set the VAT mode and withholding-tax rate.
    ///
    /// Also keeps the legacy `include_vat` column in step, as every writer does.
    pub fn with_tax(mut self, vat_mode: VatMode, wht_rate: Decimal) -> Self {
        self.include_vat = Some(vat_mode != VatMode::None);
        self.vat_mode = Some(vat_mode.to_string());
        self.withholding_tax_rate = wht_rate;
        self
    }
}

impl Taxable for CostItem {
    fn taxable(&self) -> Result<TaxableAmount, TaxError> {
        Ok(TaxableAmount::new(
            self.amount,
            resolve_vat_mode(self.vat_mode.as_deref(), self.include_vat)?,
            self.withholding_tax_rate,
        ))
    }
}

/// Status of a job event in costing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Draft,
    Completed,
}

/// A billable engagement with one revenue figure and many cost items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub event_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,

    /// Selling price.
    #[serde(default, deserialize_with = "de_or_zero")]
    pub revenue: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_vat_mode: Option<String>,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub revenue_wht_rate: Decimal,

    #[serde(default)]
    pub status: JobStatus,

    /// Source event in the inventory module, when imported from there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_id: Option<String>,

    #[serde(default, alias = "job_cost_items")]
    pub cost_items: Vec<CostItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl JobEvent {
    pub fn new(event_name: impl Into<String>, revenue: Decimal) -> Self {
        Self {
            id: None,
            event_name: event_name.into(),
            event_date: None,
            event_location: None,
            revenue,
            revenue_vat_mode: None,
            revenue_wht_rate: Decimal::ZERO,
            status: JobStatus::Draft,
            source_event_id: None,
            cost_items: Vec::new(),
            notes: None,
        }
    }

    /// Raw sum of cost item amounts.
    pub fn total_cost(&self) -> Decimal {
        self.cost_items.iter().map(|i| i.amount).sum()
    }
}

/// The revenue side of a job event.
impl Taxable for JobEvent {
    fn taxable(&self) -> Result<TaxableAmount, TaxError> {
        Ok(TaxableAmount::new(
            self.revenue,
            resolve_vat_mode(self.revenue_vat_mode.as_deref(), None)?,
            self.revenue_wht_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cost_item_from_legacy_row() {
        let json = r#"{
            "category": "travel",
            "description": "Van rental",
            "amount": 200,
            "vat_mode": null,
            "include_vat": true,
            "withholding_tax_rate": 5
        }"#;

        let item: CostItem = serde_json::from_str(json).unwrap();
        let input = item.taxable().unwrap();
        assert_eq!(input.vat_mode, VatMode::Excluded);

        let tax = item.tax().unwrap();
        assert_eq!(tax.vat_amount, Decimal::from_str("14").unwrap());
        assert_eq!(tax.wht_amount, Decimal::from_str("10").unwrap());
    }

    #[test]
    fn test_cost_item_defaults() {
        let item: CostItem = serde_json::from_str(r#"{"amount": "abc"}"#).unwrap();
        assert_eq!(item.category, "other");
        assert_eq!(item.amount, Decimal::ZERO);
        assert_eq!(item.taxable().unwrap().vat_mode, VatMode::None);
    }

    #[test]
    fn test_with_tax_sets_legacy_flag() {
        let item = CostItem::new("staff", "Crew", Decimal::from(1500))
            .with_tax(VatMode::Included, Decimal::from(3));
        assert_eq!(item.vat_mode.as_deref(), Some("included"));
        assert_eq!(item.include_vat, Some(true));

        let item = item.with_tax(VatMode::None, Decimal::ZERO);
        assert_eq!(item.include_vat, Some(false));
    }

    #[test]
    fn test_job_event_with_items_alias() {
        let json = r#"{
            "event_name": "Wedding booth",
            "event_date": "2025-03-14",
            "revenue": 20000,
            "revenue_vat_mode": "excluded",
            "revenue_wht_rate": 3,
            "job_cost_items": [
                {"category": "staff", "amount": 3000},
                {"category": "travel", "amount": 800.5}
            ]
        }"#;

        let event: JobEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.cost_items.len(), 2);
        assert_eq!(event.total_cost(), Decimal::from_str("3800.5").unwrap());
        assert_eq!(event.status, JobStatus::Draft);

        let revenue = event.tax().unwrap();
        assert_eq!(revenue.net_receivable(), Decimal::from(20800));
    }

    #[test]
    fn test_unknown_revenue_vat_mode_is_rejected() {
        let mut event = JobEvent::new("Fair", Decimal::from(100));
        event.revenue_vat_mode = Some("sometimes".to_string());
        assert!(event.tax().is_err());
    }
}
