//! Payment schedules of leads.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::Period;
use crate::error::{TaxError, WorkflowError};
use crate::models::{Installment, Lead};
use crate::tax::{checked_sum, Taxable, TaxBreakdown};

/// What a lead owes and has paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFinancials {
    /// Confirmed price, else the quote.
    pub base_price: Decimal,
    pub tax: TaxBreakdown,
    /// Net amount the customer owes in total.
    pub net_total: Decimal,
    pub deposit: Decimal,
    /// Σ paid installment amounts.
    pub paid_installments: Decimal,
    /// Deposit plus paid installments.
    pub total_paid: Decimal,
    /// May go negative when the customer overpaid.
    pub outstanding: Decimal,
    pub installment_count: usize,
    pub paid_count: usize,
}

impl LeadFinancials {
    pub fn compute(lead: &Lead) -> Result<Self, TaxError> {
        let tax = lead.tax()?;

        let paid: Vec<&Installment> = lead.installments.iter().filter(|i| i.is_paid).collect();
        let paid_installments = paid
            .iter()
            .try_fold(Decimal::ZERO, |sum, i| checked_sum(sum, i.amount))?;
        let total_paid = checked_sum(lead.deposit, paid_installments)?;
        let outstanding = tax
            .net_payable
            .checked_sub(total_paid)
            .ok_or(TaxError::AmountTooLarge(total_paid))?;

        Ok(Self {
            base_price: lead.base_price(),
            tax,
            net_total: tax.net_payable,
            deposit: lead.deposit,
            paid_installments,
            total_paid,
            outstanding,
            installment_count: lead.installments.len(),
            paid_count: paid.len(),
        })
    }
}

/// Number rows 1..n in their current order.
pub fn renumber(installments: &mut [Installment]) {
    for (i, row) in installments.iter_mut().enumerate() {
        row.installment_number = i as u32 + 1;
    }
}

/// Remove the row with `installment_number` and renumber the rest.
///
/// Returns the removed row, if there was one.
pub fn remove_installment(
    installments: &mut Vec<Installment>,
    installment_number: u32,
) -> Option<Installment> {
    let pos = installments
        .iter()
        .position(|i| i.installment_number == installment_number)?;
    let removed = installments.remove(pos);
    renumber(installments);
    Some(removed)
}

/// Validate a whole schedule and return it ready to store.
///
/// Either every row passes or nothing is returned. Zero-amount rows are
/// dropped and the rest renumbered.
pub fn replace_all(rows: Vec<Installment>) -> Result<Vec<Installment>, WorkflowError> {
    for (i, row) in rows.iter().enumerate() {
        if row.amount < Decimal::ZERO {
            return Err(WorkflowError::InvalidInstallment {
                number: i as u32 + 1,
                reason: format!("amount must not be negative: {}", row.amount),
            });
        }
        if row.paid_date.is_some() && !row.is_paid {
            return Err(WorkflowError::InvalidInstallment {
                number: i as u32 + 1,
                reason: "paid date set on an unpaid installment".to_string(),
            });
        }
    }

    let mut schedule: Vec<Installment> = rows.into_iter().filter(|r| !r.amount.is_zero()).collect();
    renumber(&mut schedule);

    debug!("Installment schedule replaced with {} rows", schedule.len());
    Ok(schedule)
}

/// Scheduled payments of one month across many leads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPaymentSummary {
    /// Unpaid rows due in the month.
    pub total_due: Decimal,
    pub due_count: usize,
    /// Paid rows due in the month.
    pub total_paid: Decimal,
    pub paid_count: usize,
    /// Unpaid rows due before `today`, in any month.
    pub overdue_total: Decimal,
    pub overdue_count: usize,
}

impl MonthPaymentSummary {
    pub fn compute<'a, I>(leads: I, period: Period, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Lead>,
    {
        let mut summary = Self::default();

        let scheduled = leads
            .into_iter()
            .flat_map(|lead| lead.installments.iter())
            .filter_map(|row| row.due_date.map(|due| (row, due)));

        for (row, due) in scheduled {
            if period.contains(Some(due)) {
                if row.is_paid {
                    summary.total_paid += row.amount;
                    summary.paid_count += 1;
                } else {
                    summary.total_due += row.amount;
                    summary.due_count += 1;
                }
            }
            if !row.is_paid && due < today {
                summary.overdue_total += row.amount;
                summary.overdue_count += 1;
            }
        }

        summary
    }
}
