//! CRM lead records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TaxError, WorkflowError};
use crate::money::de_or_zero;
use crate::tax::{resolve_vat_mode, Taxable, TaxableAmount};

/// Pipeline column of a lead on the kanban board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Lead,
    Booking,
    #[serde(alias = "quotation_sent")]
    FollowingUp,
    Accepted,
    Rejected,
    DebtCollection,
    Cancelled,
}

impl LeadStatus {
    /// Board columns, left to right.
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::Lead,
        LeadStatus::Booking,
        LeadStatus::FollowingUp,
        LeadStatus::Accepted,
        LeadStatus::Rejected,
        LeadStatus::DebtCollection,
        LeadStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Lead => "lead",
            LeadStatus::Booking => "booking",
            LeadStatus::FollowingUp => "following_up",
            LeadStatus::Accepted => "accepted",
            LeadStatus::Rejected => "rejected",
            LeadStatus::DebtCollection => "debt_collection",
            LeadStatus::Cancelled => "cancelled",
        }
    }

    /// English label.
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::Lead => "Lead",
            LeadStatus::Booking => "Booking",
            LeadStatus::FollowingUp => "Following Up",
            LeadStatus::Accepted => "Accepted",
            LeadStatus::Rejected => "Rejected",
            LeadStatus::DebtCollection => "Debt Collection",
            LeadStatus::Cancelled => "Cancelled",
        }
    }

    /// Thai label.
    pub fn label_th(&self) -> &'static str {
        match self {
            LeadStatus::Lead => "ลูกค้าใหม่",
            LeadStatus::Booking => "จอง",
            LeadStatus::FollowingUp => "ติดตาม",
            LeadStatus::Accepted => "ตอบรับ",
            LeadStatus::Rejected => "ปฏิเสธ",
            LeadStatus::DebtCollection => "เก็บเงิน",
            LeadStatus::Cancelled => "ยกเลิก",
        }
    }

    /// Closed leads no longer need follow-up.
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Accepted | LeadStatus::Cancelled)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "quotation_sent" {
            return Ok(LeadStatus::FollowingUp);
        }
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(WorkflowError::UnknownStatus {
                kind: "lead",
                value: s,
            })
    }
}

/// One row of a lead's payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position in the schedule.
    pub installment_number: u32,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub amount: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_paid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

impl Installment {
    pub fn new(installment_number: u32, amount: Decimal) -> Self {
        Self {
            installment_number,
            amount,
            due_date: None,
            is_paid: false,
            paid_date: None,
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn paid(mut self, date: Option<NaiveDate>) -> Self {
        self.is_paid = true;
        self.paid_date = date;
        self
    }
}

/// A prospective booking in the CRM pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub id: String,

    pub customer_name: String,

    #[serde(default)]
    pub status: LeadStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub quoted_price: Decimal,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub confirmed_price: Decimal,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub deposit: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_mode: Option<String>,

    #[serde(default, deserialize_with = "de_or_zero")]
    pub wht_rate: Decimal,

    /// Set while the lead is archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,

    /// Job event created from this lead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    #[serde(default)]
    pub installments: Vec<Installment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Lead {
    pub fn new(id: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            status: LeadStatus::Lead,
            package_name: None,
            event_date: None,
            event_location: None,
            quoted_price: Decimal::ZERO,
            confirmed_price: Decimal::ZERO,
            deposit: Decimal::ZERO,
            vat_mode: None,
            wht_rate: Decimal::ZERO,
            archived_at: None,
            event_id: None,
            installments: Vec::new(),
            notes: None,
        }
    }

    /// Price the lead is billed at: confirmed price, else the quote.
    pub fn base_price(&self) -> Decimal {
        if !self.confirmed_price.is_zero() {
            self.confirmed_price
        } else {
            self.quoted_price
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Taxable for Lead {
    fn taxable(&self) -> Result<TaxableAmount, TaxError> {
        Ok(TaxableAmount::new(
            self.base_price(),
            resolve_vat_mode(self.vat_mode.as_deref(), None)?,
            self.wht_rate,
        ))
    }
}

/// Audit record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub lead_id: String,
    pub old_status: LeadStatus,
    pub new_status: LeadStatus,
    /// User who made the change.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl StatusChange {
    /// Human-readable activity line.
    pub fn description(&self) -> String {
        format!("สถานะเปลี่ยน: {} → {}", self.old_status, self.new_status)
    }
}

/// Entry in a lead's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadActivity {
    pub lead_id: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LeadActivity {
    pub fn new(
        lead_id: impl Into<String>,
        description: impl Into<String>,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lead_id: lead_id.into(),
            description: description.into(),
            created_by: created_by.into(),
            created_at,
        }
    }
}

impl From<&StatusChange> for LeadActivity {
    fn from(change: &StatusChange) -> Self {
        Self::new(
            change.lead_id.clone(),
            change.description(),
            change.created_by.clone(),
            change.created_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("booking".parse::<LeadStatus>(), Ok(LeadStatus::Booking));
        assert_eq!("Debt_Collection".parse::<LeadStatus>(), Ok(LeadStatus::DebtCollection));
        assert_eq!("quotation_sent".parse::<LeadStatus>(), Ok(LeadStatus::FollowingUp));
        assert!("won".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_status_serde_alias() {
        let status: LeadStatus = serde_json::from_str("\"quotation_sent\"").unwrap();
        assert_eq!(status, LeadStatus::FollowingUp);
        assert_eq!(serde_json::to_string(&LeadStatus::FollowingUp).unwrap(), "\"following_up\"");
    }

    #[test]
    fn test_base_price_fallback() {
        let mut lead = Lead::new("l1", "Khun Somchai");
        lead.quoted_price = Decimal::from(15000);
        assert_eq!(lead.base_price(), Decimal::from(15000));

        lead.confirmed_price = Decimal::from(14000);
        assert_eq!(lead.base_price(), Decimal::from(14000));
    }

    #[test]
    fn test_closed_statuses() {
        let closed: Vec<LeadStatus> = LeadStatus::ALL.into_iter().filter(|s| s.is_closed()).collect();
        assert_eq!(closed, vec![LeadStatus::Accepted, LeadStatus::Cancelled]);
    }
}
