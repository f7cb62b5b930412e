//! Period reports across many job events.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaxError;
use crate::models::JobEvent;
use crate::tax::checked_sum;

use super::event::sorted_categories;
use super::{percent_of, CategoryTotal, EventSummary};

/// Reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Every event, dated or not.
    #[default]
    All,
    /// One calendar month.
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Self {
        Period::Month { year, month }
    }

    /// Whether an event dated `date` falls in this period.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match (self, date) {
            (Period::All, _) => true,
            (Period::Month { year, month }, Some(d)) => d.year() == *year && d.month() == *month,
            (Period::Month { .. }, None) => false,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("all"),
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    /// `all` or `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }

        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {:?}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in {:?}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {:?}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in {:?}", s));
        }

        Ok(Period::Month { year, month })
    }
}

/// Roll-up of a period report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub event_count: usize,
    /// Σ revenue as entered.
    pub total_revenue: Decimal,
    /// Σ revenue net receivable.
    pub total_net_revenue: Decimal,
    /// Σ raw cost amounts.
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub margin_percent: Decimal,
    pub cost_vat: Decimal,
    pub cost_wht: Decimal,
    pub cost_net_payable: Decimal,
    pub revenue_vat: Decimal,
    pub revenue_wht: Decimal,
}

/// Per-event summaries and totals for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: Period,
    pub events: Vec<EventSummary>,
    pub totals: ReportTotals,
    /// Raw cost per category across all events, largest first.
    pub categories: Vec<CategoryTotal>,
}

impl PeriodReport {
    /// Build the report for events falling in `period`.
    pub fn build<'a, I>(events: I, period: Period) -> Result<Self, TaxError>
    where
        I: IntoIterator<Item = &'a JobEvent>,
    {
        let mut summaries = Vec::new();
        let mut totals = ReportTotals::default();
        let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();

        for event in events.into_iter().filter(|e| period.contains(e.event_date)) {
            let summary = EventSummary::compute(event)?;

            totals.event_count += 1;
            totals.total_revenue = checked_sum(totals.total_revenue, summary.revenue)?;
            totals.total_net_revenue =
                checked_sum(totals.total_net_revenue, summary.revenue_tax.net_receivable())?;
            totals.total_cost = checked_sum(totals.total_cost, summary.total_cost())?;
            totals.cost_vat = checked_sum(totals.cost_vat, summary.costs.total_vat)?;
            totals.cost_wht = checked_sum(totals.cost_wht, summary.costs.total_wht)?;
            totals.cost_net_payable = checked_sum(totals.cost_net_payable, summary.costs.total_net)?;
            totals.revenue_vat = checked_sum(totals.revenue_vat, summary.revenue_tax.vat_amount)?;
            totals.revenue_wht = checked_sum(totals.revenue_wht, summary.revenue_tax.wht_amount)?;

            for category in &summary.categories {
                let sum = categories.entry(category.category.clone()).or_default();
                *sum = checked_sum(*sum, category.amount)?;
            }

            summaries.push(summary);
        }

        totals.profit = totals.total_net_revenue - totals.total_cost;
        totals.margin_percent = percent_of(totals.profit, totals.total_net_revenue)?;

        debug!("Report for {}: {} events", period, totals.event_count);

        Ok(Self {
            period,
            events: summaries,
            totals,
            categories: sorted_categories(categories),
        })
    }
}
