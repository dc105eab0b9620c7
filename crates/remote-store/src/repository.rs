//! Expense repository backed by the remote document store.
//!
//! Dates are stored remotely as native timestamps and normalized here to plain
//! calendar dates and millisecond counts, so callers see the same
//! [`ExpenseRecord`] shape whichever backend served them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, warn};

use spendwise_core::expenses::{
    Category, ExpenseRecord, ExpenseRepositoryTrait, ExpenseUpdate, NewExpense,
    RemoteProbeTrait,
};
use spendwise_core::{Error, Result};

use crate::client::DocumentStoreClient;
use crate::types::{Document, ExpenseFields, ExpensePatch};

/// Collection holding one document per expense.
pub const DEFAULT_COLLECTION: &str = "expenses";

fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Convert a stored document into a record. `None` when the document is unusable.
fn to_record(document: Document<ExpenseFields>) -> Option<ExpenseRecord> {
    let Document { id, fields } = document;
    let category = match fields.category.parse::<Category>() {
        Ok(category) => category,
        Err(err) => {
            warn!("Skipping remote expense {}: {}", id, err);
            return None;
        }
    };
    // Server timestamps can be pending right after a write.
    let created_at = fields
        .created_at
        .map(|ts| ts.timestamp_millis())
        .unwrap_or_else(|| Utc::now().timestamp_millis());

    Some(ExpenseRecord {
        id,
        owner_id: fields.owner_id,
        amount: fields.amount,
        category,
        note: fields.note,
        occurred_on: fields.occurred_on.date_naive(),
        created_at,
    })
}

fn decode(document: Document<ExpenseFields>) -> Result<ExpenseRecord> {
    let id = document.id.clone();
    to_record(document).ok_or_else(|| {
        Error::remote_unavailable(format!("Remote returned an unreadable document {}", id))
    })
}

pub struct RemoteExpenseRepository {
    client: DocumentStoreClient,
    collection: String,
}

impl RemoteExpenseRepository {
    pub fn new(client: DocumentStoreClient) -> Self {
        RemoteExpenseRepository {
            client,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }
}

#[async_trait]
impl ExpenseRepositoryTrait for RemoteExpenseRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        let documents = self
            .client
            .query_documents::<ExpenseFields>(&self.collection, "ownerId", owner_id)
            .await?;

        let mut records: Vec<ExpenseRecord> = documents
            .into_iter()
            .filter_map(to_record)
            .filter(|r| r.owner_id == owner_id)
            .collect();
        // The query is unordered to avoid needing a composite index.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Fetched {} remote expenses for {}", records.len(), owner_id);
        Ok(records)
    }

    async fn add(&self, new_expense: NewExpense) -> Result<ExpenseRecord> {
        new_expense.validate()?;
        let fields = ExpenseFields {
            owner_id: new_expense.owner_id,
            amount: new_expense.amount,
            category: new_expense.category.to_string(),
            note: new_expense.note.trim().to_string(),
            occurred_on: date_to_timestamp(new_expense.occurred_on),
            created_at: None,
        };

        let document = self
            .client
            .create_document::<_, ExpenseFields>(&self.collection, &fields)
            .await?;
        debug!("Created remote expense {}", document.id);
        decode(document)
    }

    async fn update(&self, id: &str, update: ExpenseUpdate) -> Result<ExpenseRecord> {
        update.validate()?;
        let patch = ExpensePatch {
            amount: update.amount,
            category: update.category.to_string(),
            note: update.note.trim().to_string(),
            occurred_on: date_to_timestamp(update.occurred_on),
        };

        let document = self
            .client
            .patch_document::<_, ExpenseFields>(&self.collection, id, &patch)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    Error::not_found(id)
                } else {
                    Error::from(err)
                }
            })?;
        debug!("Updated remote expense {}", id);
        decode(document)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.client.delete_document(&self.collection, id).await {
            Ok(()) => {
                debug!("Deleted remote expense {}", id);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                debug!("Remote expense {} already absent", id);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl RemoteProbeTrait for RemoteExpenseRepository {
    async fn probe(&self) -> Result<()> {
        self.client
            .list_documents::<serde_json::Value>(&self.collection, 1)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{start_mock_server, MockOutcome};
    use rust_decimal_macros::dec;
    use spendwise_core::sync::AvailabilityProber;
    use std::sync::Arc;
    use std::time::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn document_json(id: &str, owner: &str, occurred_on: &str, created_at: &str) -> String {
        format!(
            r#"{{"id":"{}","fields":{{"ownerId":"{}","amount":25.5,"category":"Food","note":"Lunch","occurredOn":"{}","createdAt":"{}"}}}}"#,
            id, owner, occurred_on, created_at
        )
    }

    fn repository(base_url: &str) -> RemoteExpenseRepository {
        RemoteExpenseRepository::new(DocumentStoreClient::new(base_url).unwrap())
    }

    #[tokio::test]
    async fn list_normalizes_and_sorts_by_created_at() {
        let body = format!(
            r#"{{"documents":[{},{},{}]}}"#,
            document_json("older", "u1", "2024-03-05T00:00:00Z", "2024-03-01T08:00:00Z"),
            document_json("newer", "u1", "2024-03-01T00:00:00Z", "2024-03-02T08:00:00Z"),
            document_json("foreign", "u2", "2024-03-09T00:00:00Z", "2024-03-09T08:00:00Z"),
        );
        let (base_url, captured, server) =
            start_mock_server(vec![MockOutcome::json(200, &body)]).await;

        let records = repository(&base_url).list_for_owner("u1").await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
        assert_eq!(records[1].occurred_on, date("2024-03-05"));
        assert_eq!(records[0].created_at, 1_709_366_400_000);
        assert_eq!(records[0].amount, dec!(25.5));
        assert_eq!(records[0].category, Category::Food);

        let requests = captured.lock().await.clone();
        assert_eq!(
            requests[0].target,
            "/v1/collections/expenses/documents?where.ownerId=u1"
        );
        server.abort();
    }

    #[tokio::test]
    async fn list_skips_documents_with_unknown_category() {
        let body = r#"{"documents":[{"id":"bad","fields":{"ownerId":"u1","amount":1,
            "category":"Pets","note":"Dog food","occurredOn":"2024-03-01T00:00:00Z"}}]}"#;
        let (base_url, _captured, server) =
            start_mock_server(vec![MockOutcome::json(200, body)]).await;

        let records = repository(&base_url).list_for_owner("u1").await.unwrap();
        assert!(records.is_empty());
        server.abort();
    }

    #[tokio::test]
    async fn add_sends_timestamp_and_uses_server_id() {
        let (base_url, captured, server) = start_mock_server(vec![MockOutcome::json(
            201,
            &document_json("doc-42", "u1", "2024-03-01T00:00:00Z", "2024-03-01T12:30:00.123Z"),
        )])
        .await;

        let record = repository(&base_url)
            .add(NewExpense {
                owner_id: "u1".to_string(),
                amount: dec!(25.5),
                category: Category::Food,
                note: "Lunch".to_string(),
                occurred_on: date("2024-03-01"),
            })
            .await
            .unwrap();

        assert_eq!(record.id, "doc-42");
        assert_eq!(record.created_at, 1_709_296_200_123);
        assert_eq!(record.occurred_on, date("2024-03-01"));

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "POST");
        let body = requests[0].json_body();
        assert_eq!(body["fields"]["occurredOn"], "2024-03-01T00:00:00Z");
        assert_eq!(body["fields"]["category"], "Food");
        assert!(body["fields"].get("createdAt").is_none());
        server.abort();
    }

    #[tokio::test]
    async fn update_patches_mutable_fields_only() {
        let (base_url, captured, server) = start_mock_server(vec![MockOutcome::json(
            200,
            &document_json("doc-1", "u1", "2024-04-02T00:00:00Z", "2024-03-01T12:30:00.123Z"),
        )])
        .await;

        let record = repository(&base_url)
            .update(
                "doc-1",
                ExpenseUpdate {
                    amount: dec!(25.5),
                    category: Category::Food,
                    note: "Lunch".to_string(),
                    occurred_on: date("2024-04-02"),
                },
            )
            .await
            .unwrap();
        assert_eq!(record.created_at, 1_709_296_200_123);
        assert_eq!(record.owner_id, "u1");

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].target, "/v1/collections/expenses/documents/doc-1");
        let body = requests[0].json_body();
        assert!(body["fields"].get("ownerId").is_none());
        assert!(body["fields"].get("createdAt").is_none());
        server.abort();
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let (base_url, _captured, server) = start_mock_server(vec![MockOutcome::json(
            404,
            r#"{"code":"NOT_FOUND","message":"No document to update"}"#,
        )])
        .await;

        let err = repository(&base_url)
            .update(
                "gone",
                ExpenseUpdate {
                    amount: dec!(1),
                    category: Category::Other,
                    note: "x".to_string(),
                    occurred_on: date("2024-04-02"),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == "gone"));
        server.abort();
    }

    #[tokio::test]
    async fn delete_treats_missing_as_success() {
        let (base_url, _captured, server) = start_mock_server(vec![
            MockOutcome::json(204, ""),
            MockOutcome::json(404, r#"{"code":"NOT_FOUND","message":"gone"}"#),
        ])
        .await;

        let repo = repository(&base_url);
        repo.delete("doc-1").await.unwrap();
        repo.delete("doc-1").await.unwrap();
        server.abort();
    }

    #[tokio::test]
    async fn unprovisioned_collection_is_backend_disabled() {
        let (base_url, _captured, server) = start_mock_server(vec![MockOutcome::json(
            412,
            r#"{"code":"FAILED_PRECONDITION","message":"The database is not enabled"}"#,
        )])
        .await;

        let err = repository(&base_url).list_for_owner("u1").await.unwrap_err();
        assert!(matches!(err, Error::BackendDisabled(_)));
        server.abort();
    }

    #[tokio::test]
    async fn server_errors_are_remote_unavailable() {
        let (base_url, _captured, server) = start_mock_server(vec![MockOutcome::json(
            500,
            r#"{"code":"INTERNAL","message":"boom"}"#,
        )])
        .await;

        let err = repository(&base_url).delete("doc-1").await.unwrap_err();
        assert!(err.is_remote_failure());
        server.abort();
    }

    #[tokio::test]
    async fn probe_reads_a_single_document() {
        let (base_url, captured, server) =
            start_mock_server(vec![MockOutcome::json(200, r#"{"documents":[]}"#)]).await;

        repository(&base_url)
            .with_collection("team-expenses")
            .probe()
            .await
            .unwrap();
        let requests = captured.lock().await.clone();
        assert_eq!(
            requests[0].target,
            "/v1/collections/team-expenses/documents?limit=1"
        );
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_server_fails_probe() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = repository(&format!("http://{}", addr))
            .probe()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteUnavailable(_)));
    }

    #[test]
    fn dates_map_to_utc_midnight() {
        assert_eq!(
            date_to_timestamp(date("2024-02-29")).to_rfc3339(),
            "2024-02-29T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn slow_store_is_judged_unavailable() {
        let (base_url, captured, server) = start_mock_server(vec![MockOutcome::Respond {
            status: 200,
            body: r#"{"documents":[]}"#.to_string(),
            delay_ms: 2_000,
        }])
        .await;

        let prober = AvailabilityProber::new(
            Arc::new(repository(&base_url)),
            Duration::from_millis(100),
        );
        assert!(!prober.is_remote_available().await);
        assert!(!prober.is_remote_available().await);
        assert_eq!(captured.lock().await.len(), 1);
        server.abort();
    }

    #[tokio::test]
    async fn responsive_store_is_judged_available() {
        let (base_url, _captured, server) = start_mock_server(vec![MockOutcome::Respond {
            status: 200,
            body: r#"{"documents":[]}"#.to_string(),
            delay_ms: 20,
        }])
        .await;

        let prober = AvailabilityProber::new(
            Arc::new(repository(&base_url)),
            Duration::from_millis(2_000),
        );
        assert!(prober.is_remote_available().await);
        server.abort();
    }
}
