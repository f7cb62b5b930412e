//! Data models for job costing, expense claims and CRM leads.

pub mod claim;
pub mod config;
pub mod costing;
pub mod lead;

pub use claim::{ClaimStatus, ClaimType, ExpenseClaim};
pub use config::TallyConfig;
pub use costing::{CostItem, JobEvent, JobStatus};
pub use lead::{Installment, Lead, LeadActivity, LeadStatus, StatusChange};
