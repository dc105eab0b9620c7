//! Expense CRUD and summary endpoints.
//!
//! Every route is scoped to the owner named in the `x-owner-id` header, which an
//! upstream identity layer is expected to set. Another owner's record answers
//! like a missing one.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use spendwise_core::expenses::{
    Category, ExpenseFilter, ExpenseRecord, ExpenseUpdate, NewExpense, SpendingSummary,
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

pub const OWNER_HEADER: &str = "x-owner-id";

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body for create and update. Category stays a string so unknown names come
/// back as a validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBody {
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ListQuery {
    fn into_filter(self) -> ApiResult<ExpenseFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_category(raw)?),
            _ => None,
        };
        Ok(ExpenseFilter {
            category,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

fn parse_category(raw: &str) -> ApiResult<Category> {
    raw.parse::<Category>()
        .map_err(|e| ApiError::from(spendwise_core::Error::from(e)))
}

fn owner_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", OWNER_HEADER)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn list_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ExpenseRecord>>> {
    let owner = owner_id(&headers)?;
    let filter = query.into_filter()?;
    let records = state
        .expense_service
        .list_filtered(&owner, &filter)
        .await?;
    debug!("Listed {} expenses for {}", records.len(), owner);
    Ok(Json(records))
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ExpenseBody>,
) -> ApiResult<(StatusCode, Json<ExpenseRecord>)> {
    let owner = owner_id(&headers)?;
    let new_expense = NewExpense {
        owner_id: owner,
        amount: body.amount,
        category: parse_category(&body.category)?,
        note: body.note,
        occurred_on: body.occurred_on,
    };
    let record = state.expense_service.add(new_expense).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ExpenseBody>,
) -> ApiResult<Json<ExpenseRecord>> {
    let owner = owner_id(&headers)?;
    let update = ExpenseUpdate {
        amount: body.amount,
        category: parse_category(&body.category)?,
        note: body.note,
        occurred_on: body.occurred_on,
    };
    let record = state.expense_service.update(&owner, &id, update).await?;
    Ok(Json(record))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let owner = owner_id(&headers)?;
    state.expense_service.delete(&owner, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SpendingSummary>> {
    let owner = owner_id(&headers)?;
    let today = Utc::now().date_naive();
    let summary = state.expense_service.summarize(&owner, today).await?;
    Ok(Json(summary))
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/summary", get(get_summary))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}
