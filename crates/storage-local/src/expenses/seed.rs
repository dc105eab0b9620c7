//! Illustrative records for an owner's first visit.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use spendwise_core::expenses::{Category, NewExpense};

struct SampleExpense {
    days_ago: i64,
    category: Category,
    /// Amount in cents
    cents: i64,
    note: &'static str,
}

const SAMPLE_EXPENSES: [SampleExpense; 5] = [
    SampleExpense {
        days_ago: 1,
        category: Category::Food,
        cents: 2550,
        note: "Lunch at downtown cafe",
    },
    SampleExpense {
        days_ago: 2,
        category: Category::Transport,
        cents: 4500,
        note: "Gas for the car",
    },
    SampleExpense {
        days_ago: 3,
        category: Category::Utilities,
        cents: 12000,
        note: "Monthly internet bill",
    },
    SampleExpense {
        days_ago: 5,
        category: Category::Entertainment,
        cents: 1599,
        note: "Netflix subscription",
    },
    SampleExpense {
        days_ago: 7,
        category: Category::Health,
        cents: 8500,
        note: "Doctor visit copay",
    },
];

/// Sample inputs for `owner_id`, dated relative to `today`.
pub fn sample_expenses(owner_id: &str, today: NaiveDate) -> Vec<NewExpense> {
    SAMPLE_EXPENSES
        .iter()
        .map(|sample| NewExpense {
            owner_id: owner_id.to_string(),
            amount: Decimal::new(sample.cents, 2),
            category: sample.category,
            note: sample.note.to_string(),
            occurred_on: today - Duration::days(sample.days_ago),
        })
        .collect()
}
