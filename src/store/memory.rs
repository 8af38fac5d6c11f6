use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{CertificateStore, StoreError};
use crate::filter::{EqFilter, OrderBy, SortDirection};
use crate::models::{Certificate, CertificateField, CertificateId, NewCertificate};

/// Message the hosted API gives when a single-row select matches zero or many rows
pub const SINGLE_ROW_MESSAGE: &str = "JSON object requested, multiple (or no) rows returned";

/// Process-local certificates table with the same observable behavior as the
/// hosted one: store-assigned ids, creation timestamps, keyed writes that
/// silently match nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<MemoryTable>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<Certificate>,
    last_created: Option<DateTime<Utc>>,
    write_failure: Option<String>,
}

impl MemoryTable {
    /// Creation timestamps are strictly increasing so newest-first order is total
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created
    }

    fn check_writable(&self, endpoint: &str) -> Result<(), StoreError> {
        match &self.write_failure {
            Some(message) => Err(StoreError::api(endpoint, 400, message.clone())),
            None => Ok(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `message`, the way a store-side
    /// constraint or policy rejection would. `None` restores normal writes.
    pub async fn set_write_failure(&self, message: Option<String>) {
        self.table.write().await.write_failure = message;
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn column_value<'a>(cert: &'a Certificate, column: &str) -> Result<&'a str, StoreError> {
    if column == "id" {
        return Ok(cert.id.as_str());
    }
    column
        .parse::<CertificateField>()
        .map(|field| cert.text(field))
        .map_err(|_| unknown_column(column))
}

fn unknown_column(column: &str) -> StoreError {
    StoreError::api("memory", 400, format!("column certificates.{} does not exist", column))
}

fn compare(a: &Certificate, b: &Certificate, column: &str) -> Result<Ordering, StoreError> {
    if column == "created_at" {
        return Ok(a.created_at.cmp(&b.created_at));
    }
    Ok(column_value(a, column)?.cmp(column_value(b, column)?))
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn select_all(&self, order: &OrderBy) -> Result<Vec<Certificate>, StoreError> {
        let table = self.table.read().await;
        let mut rows = table.rows.clone();

        // Validate the column once so sort_by can stay infallible
        if let Some(first) = rows.first() {
            compare(first, first, &order.column)?;
        }
        rows.sort_by(|a, b| {
            let ord = compare(a, b, &order.column).unwrap_or(Ordering::Equal);
            match order.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(rows)
    }

    async fn select_single(&self, filter: &EqFilter) -> Result<Certificate, StoreError> {
        let table = self.table.read().await;

        let mut matches = Vec::new();
        for row in &table.rows {
            if column_value(row, &filter.column)? == filter.value {
                matches.push(row);
            }
        }

        match matches.as_slice() {
            [only] => Ok((*only).clone()),
            _ => Err(StoreError::Api {
                endpoint: "memory".to_string(),
                status: 406,
                message: SINGLE_ROW_MESSAGE.to_string(),
                code: Some("PGRST116".to_string()),
            }),
        }
    }

    async fn insert(&self, rows: &[NewCertificate]) -> Result<Vec<Certificate>, StoreError> {
        let mut table = self.table.write().await;
        table.check_writable("memory insert")?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let id = CertificateId::new(Uuid::new_v4().to_string());
            let created_at = table.next_created_at();
            inserted.push(row.clone().into_certificate(id, created_at));
        }
        table.rows.extend(inserted.iter().cloned());

        info!(count = inserted.len(), "inserted certificates");
        Ok(inserted)
    }

    async fn update(&self, id: &CertificateId, row: &NewCertificate) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.check_writable("memory update")?;

        if let Some(existing) = table.rows.iter_mut().find(|c| &c.id == id) {
            let created_at = existing.created_at;
            *existing = row.clone().into_certificate(id.clone(), Utc::now());
            existing.created_at = created_at;
            info!(%id, "updated certificate");
        }
        Ok(())
    }

    async fn delete(&self, id: &CertificateId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.check_writable("memory delete")?;

        let before = table.rows.len();
        table.rows.retain(|c| &c.id != id);
        if table.rows.len() != before {
            info!(%id, "deleted certificate");
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificateDraft, CompletionStatus};

    fn row(name: &str, serial: &str) -> NewCertificate {
        let mut draft = CertificateDraft::example();
        draft.student_name = name.to_string();
        draft.serial_number = serial.to_string();
        draft.clean().unwrap()
    }

    #[tokio::test]
    async fn select_all_newest_first() {
        let store = MemoryStore::new();
        store.insert(&[row("First", "S-1")]).await.unwrap();
        store.insert(&[row("Second", "S-2"), row("Third", "S-3")]).await.unwrap();

        let names: Vec<_> = store
            .select_all(&OrderBy::newest_first())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.student_name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn select_all_rejects_unknown_column() {
        let store = MemoryStore::new();
        store.insert(&[row("First", "S-1")]).await.unwrap();

        let err = store
            .select_all(&OrderBy::new("nope", SortDirection::Asc))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn select_single_requires_exactly_one_match() {
        let store = MemoryStore::new();
        store.insert(&[row("A", "DUP"), row("B", "DUP"), row("C", "ONE")]).await.unwrap();

        let one = store
            .select_single(&EqFilter::field(CertificateField::SerialNumber, "ONE"))
            .await
            .unwrap();
        assert_eq!(one.student_name, "C");

        for serial in ["DUP", "NONE", "one"] {
            let err = store
                .select_single(&EqFilter::field(CertificateField::SerialNumber, serial))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), SINGLE_ROW_MESSAGE);
        }
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let store = MemoryStore::new();
        let created = store.insert(&[row("Before", "S-1")]).await.unwrap().remove(0);

        let mut replacement = row("After", "S-1");
        replacement.completion_status = CompletionStatus::Failed;
        store.update(&created.id, &replacement).await.unwrap();

        let rows = store.select_all(&OrderBy::newest_first()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, created.id);
        assert_eq!(rows[0].student_name, "After");
        assert_eq!(rows[0].completion_status, CompletionStatus::Failed);
        assert_eq!(rows[0].created_at, created.created_at);
    }

    #[tokio::test]
    async fn write_failure_rejects_writes_atomically() {
        let store = MemoryStore::new();
        store.set_write_failure(Some("duplicate key value".into())).await;

        let err = store.insert(&[row("A", "S-1"), row("B", "S-2")]).await.unwrap_err();
        assert_eq!(err.to_string(), "duplicate key value");
        assert!(store.is_empty().await);
    }
}
