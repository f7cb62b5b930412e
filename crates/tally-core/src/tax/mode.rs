//! VAT mode and legacy `include_vat` resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// How an entered amount relates to VAT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// No VAT relationship.
    #[default]
    None,
    /// The amount already contains VAT.
    Included,
    /// VAT must be added on top of the amount.
    Excluded,
}

impl VatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VatMode::None => "none",
            VatMode::Included => "included",
            VatMode::Excluded => "excluded",
        }
    }
}

impl fmt::Display for VatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VatMode {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(VatMode::None),
            "included" => Ok(VatMode::Included),
            "excluded" => Ok(VatMode::Excluded),
            _ => Err(TaxError::UnknownVatMode(s.to_string())),
        }
    }
}

/// Resolve the VAT mode of a stored row.
///
/// Rows written before `vat_mode` existed only carry the `include_vat` boolean,
/// which meant "add 7% on top". A missing or empty `vat_mode` falls back to it.
pub fn resolve_vat_mode(
    vat_mode: Option<&str>,
    include_vat: Option<bool>,
) -> Result<VatMode, TaxError> {
    match vat_mode.filter(|m| !m.trim().is_empty()) {
        Some(mode) => mode.parse(),
        None if include_vat.unwrap_or(false) => Ok(VatMode::Excluded),
        None => Ok(VatMode::None),
    }
}
