//! Claim numbering: `EXP-YYYYMM-NNN`.

use chrono::{Datelike, NaiveDate};

/// Prefix shared by all claims created in the month of `date`.
pub fn claim_prefix(date: NaiveDate) -> String {
    format!("EXP-{:04}{:02}", date.year(), date.month())
}

/// Next claim number for the month of `date`, given the numbers already issued.
///
/// The sequence is the count of existing numbers with the month prefix plus
/// one, so gaps left by deleted claims are not reused in order.
pub fn next_claim_number<'a, I>(date: NaiveDate, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = claim_prefix(date);
    let month_prefix = format!("{}-", prefix);
    let count = existing
        .into_iter()
        .filter(|n| n.starts_with(&month_prefix))
        .count();
    format!("{}-{:03}", prefix, count + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 18).unwrap()
    }

    #[test]
    fn test_first_claim_of_month() {
        assert_eq!(next_claim_number(march(), [] as [&str; 0]), "EXP-202503-001");
    }

    #[test]
    fn test_counts_only_same_month() {
        let existing = ["EXP-202503-001", "EXP-202502-007", "EXP-202503-002"];
        assert_eq!(next_claim_number(march(), existing), "EXP-202503-003");
    }

    #[test]
    fn test_sequence_past_three_digits() {
        let existing: Vec<String> = (1..=999).map(|i| format!("EXP-202503-{:03}", i)).collect();
        assert_eq!(
            next_claim_number(march(), existing.iter().map(String::as_str)),
            "EXP-202503-1000"
        );
    }
}
