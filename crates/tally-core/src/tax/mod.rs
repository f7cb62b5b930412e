//! VAT and withholding-tax computation.
//!
//! Every monetary figure in the system (event revenue, cost line items,
//! expense claims, lead prices) goes through [`compute_tax`]. Derived values
//! are never stored; they are recomputed from the raw inputs on every read.

mod mode;

pub use mode::{resolve_vat_mode, VatMode};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Thai VAT rate as a fraction (7%).
pub const VAT_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// Withholding-tax rates offered by the entry forms, in percent.
pub const STANDARD_WHT_RATES: [u32; 5] = [0, 1, 2, 3, 5];

/// Raw inputs of a tax computation, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxableAmount {
    /// Entered amount; meaning depends on `vat_mode`.
    pub amount: Decimal,
    /// Relationship between `amount` and VAT.
    pub vat_mode: VatMode,
    /// Withholding-tax rate in percent.
    pub wht_rate: Decimal,
}

impl TaxableAmount {
    pub fn new(amount: Decimal, vat_mode: VatMode, wht_rate: Decimal) -> Self {
        Self {
            amount,
            vat_mode,
            wht_rate,
        }
    }

    /// Compute the breakdown for these inputs.
    pub fn compute(&self) -> Result<TaxBreakdown, TaxError> {
        compute_tax(self.amount, self.vat_mode, self.wht_rate)
    }
}

/// Derived tax figures. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Amount with VAT removed.
    pub base_amount: Decimal,
    /// VAT component.
    pub vat_amount: Decimal,
    /// `base_amount + vat_amount`.
    pub total_with_vat: Decimal,
    /// Withholding tax, computed on `base_amount`.
    pub wht_amount: Decimal,
    /// `total_with_vat - wht_amount`. Net receivable on the revenue side.
    pub net_payable: Decimal,
}

impl TaxBreakdown {
    /// Alias of `net_payable` for revenue.
    pub fn net_receivable(&self) -> Decimal {
        self.net_payable
    }
}

/// Compute VAT and withholding tax for an entered amount.
///
/// No rounding is applied; display code rounds.
pub fn compute_tax(
    amount: Decimal,
    vat_mode: VatMode,
    wht_rate_percent: Decimal,
) -> Result<TaxBreakdown, TaxError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TaxError::NegativeAmount(amount));
    }
    if wht_rate_percent < Decimal::ZERO || wht_rate_percent > Decimal::ONE_HUNDRED {
        return Err(TaxError::InvalidWhtRate(wht_rate_percent));
    }

    let too_large = || TaxError::AmountTooLarge(amount);

    let (base_amount, vat_amount) = match vat_mode {
        VatMode::Included => {
            let base = amount
                .checked_div(Decimal::ONE + VAT_RATE)
                .ok_or_else(too_large)?;
            (base, amount - base)
        }
        VatMode::Excluded => (amount, amount.checked_mul(VAT_RATE).ok_or_else(too_large)?),
        VatMode::None => (amount, Decimal::ZERO),
    };

    let total_with_vat = base_amount.checked_add(vat_amount).ok_or_else(too_large)?;
    let wht_amount = base_amount
        .checked_mul(wht_rate_percent / Decimal::ONE_HUNDRED)
        .ok_or_else(too_large)?;

    Ok(TaxBreakdown {
        base_amount,
        vat_amount,
        total_with_vat,
        wht_amount,
        net_payable: total_with_vat - wht_amount,
    })
}

/// `a + b`, failing instead of overflowing.
pub(crate) fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, TaxError> {
    a.checked_add(b).ok_or(TaxError::AmountTooLarge(b))
}

/// Anything that carries a taxable amount.
pub trait Taxable {
    /// Raw tax inputs, resolving legacy VAT flags.
    fn taxable(&self) -> Result<TaxableAmount, TaxError>;

    /// Compute the tax breakdown.
    fn tax(&self) -> Result<TaxBreakdown, TaxError> {
        self.taxable()?.compute()
    }
}

impl Taxable for TaxableAmount {
    fn taxable(&self) -> Result<TaxableAmount, TaxError> {
        Ok(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec("0.000001")
    }

    #[test]
    fn test_vat_excluded_with_wht() {
        let tax = compute_tax(dec("1000"), VatMode::Excluded, dec("3")).unwrap();

        assert_eq!(tax.base_amount, dec("1000"));
        assert_eq!(tax.vat_amount, dec("70"));
        assert_eq!(tax.total_with_vat, dec("1070"));
        assert_eq!(tax.wht_amount, dec("30"));
        assert_eq!(tax.net_payable, dec("1040"));
    }

    #[test]
    fn test_vat_included() {
        let tax = compute_tax(dec("1070"), VatMode::Included, Decimal::ZERO).unwrap();

        assert!(close(tax.base_amount, dec("1000")));
        assert!(close(tax.vat_amount, dec("70")));
        assert_eq!(tax.total_with_vat, dec("1070"));
        assert!(close(tax.net_payable, dec("1070")));
    }

    #[test]
    fn test_included_reconstructs_amount() {
        for amount in ["0.01", "1", "99.99", "1234.56", "1000000", "333.33"] {
            let a = dec(amount);
            let tax = compute_tax(a, VatMode::Included, dec("5")).unwrap();
            assert_eq!(tax.base_amount + tax.vat_amount, a, "amount {amount}");
            assert_eq!(tax.total_with_vat, a, "amount {amount}");
        }
    }

    #[test]
    fn test_none_passes_amount_through() {
        let tax = compute_tax(dec("850.5"), VatMode::None, dec("3")).unwrap();

        assert_eq!(tax.vat_amount, Decimal::ZERO);
        assert_eq!(tax.base_amount, dec("850.5"));
        assert_eq!(tax.total_with_vat, dec("850.5"));
        assert_eq!(tax.wht_amount, dec("25.515"));
        assert_eq!(tax.net_payable, dec("824.985"));
    }

    #[test]
    fn test_excluded_then_included_round_trip() {
        for amount in ["1", "123.45", "5000", "0.07"] {
            let a = dec(amount);
            let gross = compute_tax(a, VatMode::Excluded, Decimal::ZERO)
                .unwrap()
                .total_with_vat;
            let back = compute_tax(gross, VatMode::Included, Decimal::ZERO).unwrap();
            assert!(close(back.base_amount, a), "amount {amount}");
        }
    }

    #[test]
    fn test_zero_amount() {
        for mode in [VatMode::None, VatMode::Included, VatMode::Excluded] {
            for rate in STANDARD_WHT_RATES {
                let tax = compute_tax(Decimal::ZERO, mode, Decimal::from(rate)).unwrap();
                assert_eq!(tax, TaxBreakdown::default());
            }
        }
    }

    #[test]
    fn test_pure() {
        let a = compute_tax(dec("777.77"), VatMode::Included, dec("2")).unwrap();
        let b = compute_tax(dec("777.77"), VatMode::Included, dec("2")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invariants_hold() {
        let tax = compute_tax(dec("4321.09"), VatMode::Excluded, dec("1")).unwrap();
        assert_eq!(tax.base_amount + tax.vat_amount, tax.total_with_vat);
        assert_eq!(tax.total_with_vat - tax.wht_amount, tax.net_payable);
    }

    #[test]
    fn test_non_standard_wht_rate_accepted() {
        let tax = compute_tax(dec("200"), VatMode::None, dec("1.5")).unwrap();
        assert_eq!(tax.wht_amount, dec("3"));
    }

    #[test]
    fn test_rejects_out_of_domain() {
        assert_eq!(
            compute_tax(dec("-1"), VatMode::None, Decimal::ZERO),
            Err(TaxError::NegativeAmount(dec("-1")))
        );
        assert_eq!(
            compute_tax(dec("1"), VatMode::None, dec("-3")),
            Err(TaxError::InvalidWhtRate(dec("-3")))
        );
        assert_eq!(
            compute_tax(dec("1"), VatMode::None, dec("101")),
            Err(TaxError::InvalidWhtRate(dec("101")))
        );
    }

    #[test]
    fn test_huge_amount_is_an_error() {
        assert_eq!(
            compute_tax(Decimal::MAX, VatMode::Excluded, Decimal::ZERO),
            Err(TaxError::AmountTooLarge(Decimal::MAX))
        );
        assert!(compute_tax(Decimal::MAX, VatMode::Included, dec("3")).is_ok());
        assert!(compute_tax(Decimal::MAX, VatMode::None, dec("100")).is_ok());
    }

    #[test]
    fn test_taxable_amount_compute() {
        let input = TaxableAmount::new(dec("200"), VatMode::Excluded, dec("5"));
        let tax = input.tax().unwrap();
        assert_eq!(tax.net_payable, dec("204"));
        assert_eq!(tax.net_receivable(), tax.net_payable);
    }
}
