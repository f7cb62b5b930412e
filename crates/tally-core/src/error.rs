//! Error types for the tally-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Tax computation precondition failed.
    #[error("tax error: {0}")]
    Tax(#[from] TaxError),

    /// A CRM or claim workflow rule rejected the operation.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Invalid input to the tax engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxError {
    /// Amounts entering the engine must be zero or positive.
    #[error("amount must not be negative: {0}")]
    NegativeAmount(Decimal),

    /// Withholding-tax rate outside 0..=100 percent.
    #[error("withholding tax rate must be between 0 and 100 percent: {0}")]
    InvalidWhtRate(Decimal),

    /// Amount so large that VAT or a total no longer fits in a decimal.
    #[error("amount too large: {0}")]
    AmountTooLarge(Decimal),

    /// VAT mode string that is not one of `none`, `included`, `excluded`.
    #[error("unknown VAT mode: {0:?}")]
    UnknownVatMode(String),
}

/// Errors raised by CRM and expense claim workflows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// No user in session.
    #[error("unauthorized")]
    Unauthorized,

    /// The user is signed in but lacks the role for this action.
    #[error("only an admin may {0}")]
    Forbidden(&'static str),

    /// The claim has already been approved or rejected.
    #[error("claim {0} has already been processed")]
    ClaimNotPending(String),

    /// The claim must be approved first.
    #[error("claim {0} has not been approved")]
    ClaimNotApproved(String),

    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Date field that is not `YYYY-MM-DD`.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Amount is not usable for the operation.
    #[error("invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: Decimal },

    /// The lead already has a job event.
    #[error("lead {0} has already been converted to an event")]
    AlreadyConverted(String),

    /// An installment row failed validation; nothing was saved.
    #[error("installment {number} is invalid: {reason}")]
    InvalidInstallment { number: u32, reason: String },

    /// Unknown status string.
    #[error("unknown {kind} status: {value:?}")]
    UnknownStatus { kind: &'static str, value: String },
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
