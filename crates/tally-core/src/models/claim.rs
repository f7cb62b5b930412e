//! Expense claim records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;
use crate::models::costing::default_category;
use crate::money::{de_or_one, de_or_zero, one};
use crate::tax::{resolve_vat_mode, Taxable, TaxableAmount};

/// Whether a claim is tied to an event or is a general expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Event,
    #[default]
    General,
}

/// Approval state of a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A staff expense-reimbursement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `EXP-YYYYMM-NNN`.
    pub claim_number: String,

    #[serde(default)]
    pub claim_type: ClaimType,

    /// Event this claim is charged to (only for [`ClaimType::Event`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_event_id: Option<String>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_category")]
    pub category: String,

    /// Explicit amount. Zero means "use unit price × quantity".
    #[serde(default, deserialize_with = "de_or_zero")]
    pub amount: Decimal,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub unit_price: Decimal,

    #[serde(default = "one", deserialize_with = "de_or_one")]
    pub quantity: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_vat: Option<bool>,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub withholding_tax_rate: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub submitted_by: String,

    #[serde(default)]
    pub status: ClaimStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl ExpenseClaim {
    /// Amount being claimed: the explicit amount, or unit price × quantity.
    pub fn claim_amount(&self) -> Decimal {
        if self.amount > Decimal::ZERO {
            self.amount
        } else {
            self.unit_price * self.quantity
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }
}

impl Taxable for ExpenseClaim {
    fn taxable(&self) -> Result<TaxableAmount, TaxError> {
        Ok(TaxableAmount::new(
            self.claim_amount(),
            resolve_vat_mode(self.vat_mode.as_deref(), self.include_vat)?,
            self.withholding_tax_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_amount_prefers_explicit_amount() {
        let claim: ExpenseClaim = serde_json::from_str(
            r#"{"claim_number": "EXP-202503-001", "title": "Taxi", "amount": 450, "unit_price": 100, "quantity": 3}"#,
        )
        .unwrap();
        assert_eq!(claim.claim_amount(), Decimal::from(450));
    }

    #[test]
    fn test_claim_amount_from_unit_price() {
        let claim: ExpenseClaim = serde_json::from_str(
            r#"{"claim_number": "EXP-202503-002", "title": "Batteries", "unit_price": "35.5", "quantity": "4"}"#,
        )
        .unwrap();
        assert_eq!(claim.quantity, Decimal::from(4));
        assert_eq!(claim.claim_amount(), Decimal::from(142));
        assert!(claim.is_pending());
        assert_eq!(claim.claim_type, ClaimType::General);
    }

    #[test]
    fn test_claim_tax_uses_claim_amount() {
        let claim: ExpenseClaim = serde_json::from_str(
            r#"{"claim_number": "EXP-202503-003", "title": "Props", "unit_price": 500, "quantity": 2,
                "vat_mode": "included", "withholding_tax_rate": 3}"#,
        )
        .unwrap();
        let tax = claim.tax().unwrap();
        assert_eq!(tax.total_with_vat, Decimal::from(1000));
    }
}
