//! Expense claim workflow.
//!
//! Staff submit claims; an admin approves or rejects them while they are
//! pending. Approving a claim charged to an event books it as a cost item of
//! that event's job costing sheet.

mod number;

pub use number::{claim_prefix, next_claim_number};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WorkflowError};
use crate::models::costing::default_category;
use crate::models::{ClaimStatus, ClaimType, CostItem, ExpenseClaim, JobEvent};
use crate::money::{parse_or, parse_or_zero};
use crate::session::Session;
use crate::tax::{Taxable, TaxBreakdown, VatMode};

/// Stored when a claim is rejected without a reason.
pub const DEFAULT_REJECT_REASON: &str = "ไม่ระบุเหตุผล";

/// Prefix of the description of cost items booked from claims.
pub const CLAIM_COST_PREFIX: &str = "[เบิกเงิน]";

const DEFAULT_UNIT: &str = "บาท";

/// Claim entry form, as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimForm {
    pub claim_type: String,
    pub job_event_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub unit_price: String,
    pub quantity: String,
    pub unit: String,
    /// `YYYY-MM-DD`; blank means today.
    pub expense_date: String,
    pub vat_mode: String,
    pub withholding_tax_rate: String,
    pub notes: String,
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Validated values of a [`ClaimForm`].
struct ClaimFields {
    claim_type: ClaimType,
    job_event_id: Option<String>,
    title: String,
    description: Option<String>,
    category: String,
    amount: Decimal,
    unit_price: Decimal,
    quantity: Decimal,
    unit: String,
    expense_date: NaiveDate,
    vat_mode: VatMode,
    withholding_tax_rate: Decimal,
    notes: Option<String>,
}

impl ClaimForm {
    fn validate(&self, today: NaiveDate) -> Result<ClaimFields> {
        let title = non_blank(&self.title).ok_or(WorkflowError::MissingField("title"))?;

        let amount = parse_or_zero(&self.amount);
        let unit_price = parse_or_zero(&self.unit_price);
        if amount <= Decimal::ZERO && unit_price <= Decimal::ZERO {
            return Err(WorkflowError::InvalidAmount {
                field: "amount",
                value: amount,
            }
            .into());
        }

        let claim_type = match self.claim_type.trim() {
            "event" => ClaimType::Event,
            _ => ClaimType::General,
        };
        let job_event_id = match claim_type {
            ClaimType::Event => {
                Some(non_blank(&self.job_event_id).ok_or(WorkflowError::MissingField("job_event_id"))?)
            }
            ClaimType::General => None,
        };

        let vat_mode = match non_blank(&self.vat_mode) {
            Some(mode) => mode.parse::<VatMode>()?,
            None => VatMode::None,
        };

        let expense_date = match non_blank(&self.expense_date) {
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|_| WorkflowError::InvalidDate(s.clone()))?,
            None => today,
        };

        Ok(ClaimFields {
            claim_type,
            job_event_id,
            title,
            description: non_blank(&self.description),
            category: non_blank(&self.category).unwrap_or_else(default_category),
            amount,
            unit_price,
            quantity: parse_or(&self.quantity, Decimal::ONE),
            unit: non_blank(&self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            expense_date,
            vat_mode,
            withholding_tax_rate: parse_or_zero(&self.withholding_tax_rate),
            notes: non_blank(&self.notes),
        })
    }
}

impl ClaimFields {
    fn apply(self, claim: &mut ExpenseClaim) -> Result<()> {
        claim.claim_type = self.claim_type;
        claim.job_event_id = self.job_event_id;
        claim.title = self.title;
        claim.description = self.description;
        claim.category = self.category;
        claim.amount = if self.amount > Decimal::ZERO {
            self.amount
        } else {
            self.unit_price * self.quantity
        };
        claim.unit_price = self.unit_price;
        claim.quantity = self.quantity;
        claim.unit = Some(self.unit);
        claim.expense_date = Some(self.expense_date);
        claim.include_vat = Some(self.vat_mode != VatMode::None);
        claim.vat_mode = Some(self.vat_mode.to_string());
        claim.withholding_tax_rate = self.withholding_tax_rate;
        claim.notes = self.notes;

        // Rejects rates outside 0..=100.
        claim.tax()?;
        Ok(())
    }
}

/// Create a pending claim from a submitted form.
pub fn create_claim<'a, I>(
    form: &ClaimForm,
    session: &Session,
    existing_numbers: I,
    today: NaiveDate,
) -> Result<ExpenseClaim>
where
    I: IntoIterator<Item = &'a str>,
{
    let user_id = session.require_user()?;
    let fields = form.validate(today)?;

    let mut claim = ExpenseClaim {
        id: None,
        claim_number: next_claim_number(today, existing_numbers),
        claim_type: ClaimType::General,
        job_event_id: None,
        title: String::new(),
        description: None,
        category: String::new(),
        amount: Decimal::ZERO,
        unit_price: Decimal::ZERO,
        quantity: Decimal::ONE,
        unit: None,
        expense_date: None,
        vat_mode: None,
        include_vat: None,
        withholding_tax_rate: Decimal::ZERO,
        notes: None,
        submitted_by: user_id.to_string(),
        status: ClaimStatus::Pending,
        approved_by: None,
        approved_at: None,
        reject_reason: None,
    };
    fields.apply(&mut claim)?;

    info!("Created claim {} ({})", claim.claim_number, claim.claim_amount());
    Ok(claim)
}

/// Replace the editable fields of a pending claim.
pub fn edit_claim(claim: &mut ExpenseClaim, form: &ClaimForm, session: &Session, today: NaiveDate) -> Result<()> {
    session.require_admin("edit claims")?;
    require_pending(claim)?;

    let fields = form.validate(today)?;
    let mut updated = claim.clone();
    fields.apply(&mut updated)?;
    *claim = updated;

    info!("Edited claim {}", claim.claim_number);
    Ok(())
}

/// Approve a pending claim.
///
/// When the claim is charged to an event that has a job costing sheet in
/// `job_events`, the cost item to add to that sheet is returned.
pub fn approve_claim(
    claim: &mut ExpenseClaim,
    session: &Session,
    at: DateTime<Utc>,
    job_events: &[JobEvent],
) -> Result<Option<CostItem>> {
    let admin = session.require_admin("approve claims")?;
    require_pending(claim)?;

    claim.status = ClaimStatus::Approved;
    claim.approved_by = Some(admin.to_string());
    claim.approved_at = Some(at);
    claim.reject_reason = None;

    info!("Approved claim {}", claim.claim_number);

    match find_job_event(claim, job_events).and_then(|e| e.id.as_deref()) {
        Some(job_event_id) => Ok(Some(cost_item_for(claim, job_event_id)?)),
        None => Ok(None),
    }
}

/// Reject a pending claim.
pub fn reject_claim(
    claim: &mut ExpenseClaim,
    session: &Session,
    at: DateTime<Utc>,
    reason: Option<&str>,
) -> Result<()> {
    let admin = session.require_admin("reject claims")?;
    require_pending(claim)?;

    claim.status = ClaimStatus::Rejected;
    claim.approved_by = Some(admin.to_string());
    claim.approved_at = Some(at);
    claim.reject_reason = Some(
        reason
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string()),
    );

    info!("Rejected claim {}", claim.claim_number);
    Ok(())
}

/// Delete a claim.
///
/// Cost items booked from an approved claim are removed from `cost_items`;
/// returns how many were removed.
pub fn delete_claim(claim: &ExpenseClaim, session: &Session, cost_items: &mut Vec<CostItem>) -> Result<usize> {
    session.require_admin("delete claims")?;

    let before = cost_items.len();
    if claim.status == ClaimStatus::Approved {
        cost_items.retain(|item| !owns_cost_item(claim, item));
    }
    let removed = before - cost_items.len();

    info!("Deleted claim {} ({} cost items)", claim.claim_number, removed);
    Ok(removed)
}

/// Cost item booking an approved claim on job costing sheet `job_event_id`.
///
/// Also used to rebuild the item after it was deleted by hand.
pub fn cost_item_for(claim: &ExpenseClaim, job_event_id: &str) -> Result<CostItem> {
    if claim.status != ClaimStatus::Approved {
        return Err(WorkflowError::ClaimNotApproved(claim.claim_number.clone()).into());
    }

    let mut item = CostItem::new(
        claim.category.clone(),
        format!("{} {}", CLAIM_COST_PREFIX, claim.title),
        claim.claim_amount(),
    );
    item.job_event_id = Some(job_event_id.to_string());
    item.unit_price = Some(claim.unit_price);
    item.quantity = Some(claim.quantity);
    item.unit = claim.unit.clone();
    item.vat_mode = claim.vat_mode.clone();
    item.include_vat = claim.include_vat;
    item.withholding_tax_rate = claim.withholding_tax_rate;
    item.notes = Some(format!(
        "{}::{}",
        claim.claim_number,
        claim.id.as_deref().unwrap_or_default()
    ));
    Ok(item)
}

/// Whether `item` was booked from `claim`.
///
/// Booked items carry `<claim number>::<claim id>` in their notes; the
/// number must match exactly.
pub fn owns_cost_item(claim: &ExpenseClaim, item: &CostItem) -> bool {
    if claim.claim_number.is_empty() {
        return false;
    }
    item.notes
        .as_deref()
        .and_then(|notes| notes.split_once("::"))
        .is_some_and(|(number, _)| number == claim.claim_number)
}

/// Job costing sheet of the event a claim is charged to.
pub fn find_job_event<'a>(claim: &ExpenseClaim, job_events: &'a [JobEvent]) -> Option<&'a JobEvent> {
    let event_id = claim.job_event_id.as_deref()?;
    job_events
        .iter()
        .find(|e| e.source_event_id.as_deref() == Some(event_id))
}

/// Tax preview of a claim.
pub fn preview_tax(claim: &ExpenseClaim) -> Result<TaxBreakdown> {
    Ok(claim.tax()?)
}

fn require_pending(claim: &ExpenseClaim) -> std::result::Result<(), WorkflowError> {
    if claim.is_pending() {
        Ok(())
    } else {
        Err(WorkflowError::ClaimNotPending(claim.claim_number.clone()))
    }
}
