//! Expense domain models.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Closed set of spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Entertainment,
    Health,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ValidationError::UnknownCategory(value.to_string()))
    }
}

/// A persisted expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub owner_id: String,
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
    pub occurred_on: NaiveDate,
    /// Unix milliseconds; only used to break ties between equal dates.
    pub created_at: i64,
}

impl ExpenseRecord {
    /// Replace the mutable fields. `id`, `owner_id` and `created_at` are kept.
    pub fn apply_update(&mut self, update: ExpenseUpdate) {
        self.amount = update.amount;
        self.category = update.category;
        self.note = update.note.trim().to_string();
        self.occurred_on = update.occurred_on;
    }
}

/// Input for creating an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub owner_id: String,
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
    pub occurred_on: NaiveDate,
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(self.amount, &self.note)
    }

    /// Build the stored record once `id` and `created_at` are known.
    pub fn into_record(self, id: String, created_at: i64) -> ExpenseRecord {
        ExpenseRecord {
            id,
            owner_id: self.owner_id,
            amount: self.amount,
            category: self.category,
            note: self.note.trim().to_string(),
            occurred_on: self.occurred_on,
            created_at,
        }
    }
}

/// Mutable fields replaced by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
    pub occurred_on: NaiveDate,
}

impl ExpenseUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(self.amount, &self.note)
    }
}

fn validate_fields(amount: Decimal, note: &str) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if note.trim().is_empty() {
        return Err(ValidationError::EmptyNote);
    }
    Ok(())
}

/// Newest `occurred_on` first, then newest `created_at`.
pub fn compare_recent_first(a: &ExpenseRecord, b: &ExpenseRecord) -> Ordering {
    b.occurred_on
        .cmp(&a.occurred_on)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_recent_first(records: &mut [ExpenseRecord]) {
    records.sort_by(compare_recent_first);
}
