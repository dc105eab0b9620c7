//! Filtering and aggregate spending figures.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::expenses_model::{Category, ExpenseRecord};

/// Optional category and inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if record.occurred_on < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.occurred_on > end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    /// Share of the overall total, 0-100, one decimal place.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub this_month_total: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

impl SpendingSummary {
    /// Aggregate `records`. Entries with a non-positive amount can only come
    /// from stored data written outside validation and are left out. Sums
    /// saturate at `Decimal::MAX`.
    pub fn from_records(records: &[ExpenseRecord], today: NaiveDate) -> Self {
        let counted: Vec<&ExpenseRecord> = records
            .iter()
            .filter(|r| r.amount > Decimal::ZERO)
            .collect();
        if counted.len() < records.len() {
            warn!(
                "Leaving {} non-positive expenses out of the summary",
                records.len() - counted.len()
            );
        }

        let total = saturating_sum(counted.iter().map(|r| r.amount));
        let count = counted.len();
        // `checked_div` is `None` for an empty set.
        let average = total
            .checked_div(Decimal::from(count))
            .map(|average| average.round_dp(2))
            .unwrap_or(Decimal::ZERO);

        let this_month_total = saturating_sum(
            counted
                .iter()
                .filter(|r| {
                    r.occurred_on.year() == today.year() && r.occurred_on.month() == today.month()
                })
                .map(|r| r.amount),
        );

        let mut per_category: HashMap<Category, Decimal> = HashMap::new();
        for record in &counted {
            let entry = per_category.entry(record.category).or_default();
            *entry = entry.saturating_add(record.amount);
        }

        let mut by_category: Vec<CategoryTotal> = per_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category,
                total: amount,
                percentage: share_of(amount, total),
            })
            .collect();
        by_category.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            total,
            count,
            average,
            this_month_total,
            by_category,
        }
    }
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Percentage of `total`, one decimal place.
fn share_of(amount: Decimal, total: Decimal) -> Decimal {
    amount
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(1))
        .unwrap_or(Decimal::ZERO)
}
