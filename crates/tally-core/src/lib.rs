//! Core library for the tally event-rental back office.
//!
//! This crate provides:
//! - Thai VAT and withholding-tax computation on exact decimals
//! - Aggregation of tax breakdowns over job costing sheets and period reports
//! - CRM lead status workflow, installment schedules and outstanding balances
//! - Expense claim workflow with approval into job costing
//! - Lenient form parsing and Thai currency formatting at the boundary

pub mod aggregate;
pub mod categories;
pub mod claims;
pub mod crm;
pub mod error;
pub mod models;
pub mod money;
pub mod session;
pub mod tax;

pub use aggregate::{aggregate, aggregate_by, percent_of, EventSummary, Period, PeriodReport, TaxTotals};
pub use categories::{CategoryRegistry, Locale};
pub use crm::LeadFinancials;
pub use error::{Result, TallyError, TaxError, WorkflowError};
pub use models::{
    ClaimStatus, ClaimType, CostItem, ExpenseClaim, Installment, JobEvent, JobStatus, Lead,
    LeadActivity, LeadStatus, StatusChange, TallyConfig,
};
pub use money::{format_baht, format_thai, parse_or_zero};
pub use session::{Role, Session};
pub use tax::{compute_tax, resolve_vat_mode, TaxBreakdown, Taxable, TaxableAmount, VatMode};
