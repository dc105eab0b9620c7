//! Wire types for the document store REST API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored document: provider-assigned id plus its field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub id: String,
    pub fields: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    #[serde(default = "Vec::new")]
    pub documents: Vec<Document<T>>,
}

/// Request body for create and patch.
#[derive(Debug, Clone, Serialize)]
pub struct FieldsRequest<'a, T> {
    pub fields: &'a T,
}

/// Error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Fields of an expense document. Dates use the store's native timestamp type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFields {
    pub owner_id: String,
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    pub occurred_on: DateTime<Utc>,
    /// Assigned by the server on create; never sent by the client.
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Mutable fields sent on update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    pub occurred_on: DateTime<Utc>,
}
