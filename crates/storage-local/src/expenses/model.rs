//! Serialized shape of a locally stored expense.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use spendwise_core::expenses::{Category, ExpenseRecord};

/// One element of the JSON array kept under the expenses key.
///
/// Older clients wrote `userId` and `date`; both are still accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDB {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub amount: Decimal,
    pub category: Category,
    pub note: String,
    #[serde(alias = "date")]
    pub occurred_on: NaiveDate,
    #[serde(deserialize_with = "millis_from_number")]
    pub created_at: i64,
}

// Legacy blobs may hold fractional millisecond values.
fn millis_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("createdAt must be a finite number"));
    }
    Ok(value.trunc() as i64)
}

impl From<ExpenseDB> for ExpenseRecord {
    fn from(db: ExpenseDB) -> Self {
        ExpenseRecord {
            id: db.id,
            owner_id: db.owner_id,
            amount: db.amount,
            category: db.category,
            note: db.note,
            occurred_on: db.occurred_on,
            created_at: db.created_at,
        }
    }
}

impl From<ExpenseRecord> for ExpenseDB {
    fn from(record: ExpenseRecord) -> Self {
        ExpenseDB {
            id: record.id,
            owner_id: record.owner_id,
            amount: record.amount,
            category: record.category,
            note: record.note,
            occurred_on: record.occurred_on,
            created_at: record.created_at,
        }
    }
}
