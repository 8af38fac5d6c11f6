// dashboard/mod.rs - admin dashboard view-model
//
// AdminDashboard owns all admin-side state: the create/update form, the batch
// editor, the fetched list with its search box and visibility toggle. Every
// operation is an explicit method; a rendering layer (HTTP handlers, the CLI)
// only reads snapshots and calls methods.
//
// Store results are applied only while the dashboard is mounted. A request
// that finishes after logout still completes on the store side, but its
// outcome is dropped instead of mutating a dashboard nobody is looking at.

pub mod batch;
pub mod form;
pub mod list;
pub mod session;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::csv_io::{self, CsvError};
use crate::filter::OrderBy;
use crate::models::{
    clean_rows, Certificate, CertificateDraft, CertificateField, CertificateId, DraftPatch, RowError,
    UnknownStatus,
};
use crate::store::{CertificateStore, StoreError};

pub use batch::BatchEditor;
pub use form::{looks_like_email, CertificateForm};
pub use list::{filter_certificates, CertificateList};
pub use session::{DashboardHandle, SessionRegistry};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this certificate?";

/// Outcome message of a successful dashboard operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
    DeleteCancelled,
    Saved(usize),
    Imported(usize),
    Loaded(usize),
    FormCleared,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Created => f.write_str("Certificate created!"),
            Notice::Updated => f.write_str("Certificate updated!"),
            Notice::Deleted => f.write_str("Deleted successfully"),
            Notice::DeleteCancelled => f.write_str("Delete cancelled"),
            Notice::Saved(n) => write!(f, "Saved {} certificates", n),
            Notice::Imported(n) => write!(f, "Bulk upload successful! Inserted {} certificates", n),
            Notice::Loaded(n) => write!(f, "Loaded {} certificates", n),
            Notice::FormCleared => f.write_str("Form cleared"),
        }
    }
}

impl Serialize for Notice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Error: {0}")]
    Submit(#[source] StoreError),

    #[error("Error deleting: {0}")]
    Delete(#[source] StoreError),

    #[error("Error saving rows: {0}")]
    SaveRows(#[source] StoreError),

    #[error("Bulk upload error: {0}")]
    Import(#[source] StoreError),

    #[error("Error loading certificates: {0}")]
    Refresh(#[source] StoreError),

    #[error("Error: {0}")]
    InvalidStatus(#[source] UnknownStatus),

    #[error("Error saving rows: {0}")]
    InvalidBatchRow(#[source] RowError),

    #[error("Bulk upload error: {0}")]
    InvalidUploadRow(#[source] RowError),

    #[error("Bulk upload error: {0}")]
    Csv(#[from] CsvError),

    #[error("Please fill in: {}", field_list(.0))]
    MissingFields(Vec<CertificateField>),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Row {index} does not exist (batch has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("No certificate with id {0} in the current list")]
    UnknownCertificate(String),
}

fn field_list(fields: &[CertificateField]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

impl DashboardError {
    /// Store failure behind this error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            DashboardError::Submit(e)
            | DashboardError::Delete(e)
            | DashboardError::SaveRows(e)
            | DashboardError::Import(e)
            | DashboardError::Refresh(e) => Some(e),
            _ => None,
        }
    }
}

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A pre-made answer, e.g. from a `?confirm=` query or a `--yes` flag
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Shared "is the owning view still alive" flag
#[derive(Debug, Clone)]
pub struct MountFlag(Arc<AtomicBool>);

impl MountFlag {
    pub fn mounted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::mounted()
    }
}

/// Read-only view of the dashboard for rendering
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub form: CertificateForm,
    pub editing: bool,
    pub batch_rows: Vec<CertificateDraft>,
    pub search: String,
    pub show_table: bool,
    pub total: usize,
    pub matching: usize,
    /// Filtered rows; only present while the table is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Vec<Certificate>>,
}

pub struct AdminDashboard {
    store: Arc<dyn CertificateStore>,
    mount: MountFlag,
    form: CertificateForm,
    batch: BatchEditor,
    list: CertificateList,
}

impl AdminDashboard {
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        Self::with_mount(store, MountFlag::mounted())
    }

    pub fn with_mount(store: Arc<dyn CertificateStore>, mount: MountFlag) -> Self {
        Self {
            store,
            mount,
            form: CertificateForm::default(),
            batch: BatchEditor::default(),
            list: CertificateList::default(),
        }
    }

    /// Create and load the list, as when the page first renders
    pub async fn mount(store: Arc<dyn CertificateStore>, mount: MountFlag) -> Self {
        let mut dashboard = Self::with_mount(store, mount);
        if let Err(e) = dashboard.refresh().await {
            warn!("initial certificate load failed: {}", e);
        }
        dashboard
    }

    pub fn mount_flag(&self) -> &MountFlag {
        &self.mount
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    pub fn form(&self) -> &CertificateForm {
        &self.form
    }

    pub fn batch(&self) -> &BatchEditor {
        &self.batch
    }

    pub fn list(&self) -> &CertificateList {
        &self.list
    }

    /// Fetch every certificate newest first and replace the list wholesale
    pub async fn refresh(&mut self) -> Result<Notice, DashboardError> {
        let certificates = self
            .store
            .select_all(&OrderBy::newest_first())
            .await
            .map_err(DashboardError::Refresh)?;

        let count = certificates.len();
        if self.applies() {
            self.list.replace(certificates);
        }
        Ok(Notice::Loaded(count))
    }

    /// Refresh after a successful write. A failure here is logged and the
    /// write is still reported as successful.
    async fn refresh_after_write(&mut self) {
        if !self.is_mounted() {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!("refresh after write failed: {}", e);
        }
    }

    fn applies(&self) -> bool {
        let mounted = self.is_mounted();
        if !mounted {
            debug!("dashboard unmounted, dropping store result");
        }
        mounted
    }

    // Form

    pub fn set_form_field(&mut self, field: CertificateField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn apply_form_patch(&mut self, patch: &DraftPatch) {
        patch.apply_to(&mut self.form.fields);
    }

    /// Insert the form as a new record, or update the record being edited
    pub async fn submit(&mut self) -> Result<Notice, DashboardError> {
        let missing = self.form.fields.missing_required();
        if !missing.is_empty() {
            return Err(DashboardError::MissingFields(missing));
        }
        if !looks_like_email(&self.form.fields.student_email) {
            return Err(DashboardError::InvalidEmail(self.form.fields.student_email.clone()));
        }

        let row = self.form.fields.clean().map_err(DashboardError::InvalidStatus)?;
        let notice = match &self.form.id {
            Some(id) => {
                self.store.update(id, &row).await.map_err(DashboardError::Submit)?;
                Notice::Updated
            }
            None => {
                self.store
                    .insert(std::slice::from_ref(&row))
                    .await
                    .map_err(DashboardError::Submit)?;
                Notice::Created
            }
        };

        if self.applies() {
            self.form.reset();
        }
        self.refresh_after_write().await;
        Ok(notice)
    }

    /// Load a listed record into the form and switch to editing mode
    pub fn begin_edit(&mut self, id: &str) -> Result<(), DashboardError> {
        let cert = self
            .list
            .find(id)
            .ok_or_else(|| DashboardError::UnknownCertificate(id.to_string()))?
            .clone();
        self.form.load(&cert);
        Ok(())
    }

    pub fn cancel_edit(&mut self) -> Notice {
        self.form.reset();
        Notice::FormCleared
    }

    pub async fn delete(
        &mut self,
        id: &CertificateId,
        confirm: &(dyn Confirm + Sync),
    ) -> Result<Notice, DashboardError> {
        if !confirm.confirm(DELETE_PROMPT) {
            info!(%id, "delete declined");
            return Ok(Notice::DeleteCancelled);
        }

        self.store.delete(id).await.map_err(DashboardError::Delete)?;
        self.refresh_after_write().await;
        Ok(Notice::Deleted)
    }

    // Batch editor

    pub fn add_batch_row(&mut self) -> usize {
        self.batch.add_row()
    }

    pub fn set_batch_cell(
        &mut self,
        index: usize,
        field: CertificateField,
        value: impl Into<String>,
    ) -> Result<(), DashboardError> {
        if self.batch.set_cell(index, field, value) {
            Ok(())
        } else {
            Err(DashboardError::RowOutOfRange {
                index,
                len: self.batch.len(),
            })
        }
    }

    /// Insert every batch row in one request
    pub async fn save_batch(&mut self) -> Result<Notice, DashboardError> {
        let rows = self.batch.cleaned().map_err(DashboardError::InvalidBatchRow)?;
        let inserted = self.store.insert(&rows).await.map_err(DashboardError::SaveRows)?;

        if self.applies() {
            self.batch.reset();
        }
        self.refresh_after_write().await;
        Ok(Notice::Saved(inserted.len()))
    }

    /// Parse an uploaded CSV and insert all rows in one request
    pub async fn import_csv(&mut self, input: &[u8]) -> Result<Notice, DashboardError> {
        let drafts = csv_io::parse_drafts(input)?;
        if drafts.is_empty() {
            return Ok(Notice::Imported(0));
        }

        let rows = clean_rows(&drafts).map_err(DashboardError::InvalidUploadRow)?;
        let inserted = self.store.insert(&rows).await.map_err(DashboardError::Import)?;

        info!(count = inserted.len(), "bulk upload finished");
        self.refresh_after_write().await;
        Ok(Notice::Imported(inserted.len()))
    }

    // List

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.list.search = query.into();
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.list.toggle()
    }

    pub fn visible_certificates(&self) -> Vec<&Certificate> {
        self.list.filtered()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let filtered = self.list.filtered();
        DashboardSnapshot {
            form: self.form.clone(),
            editing: self.form.is_editing(),
            batch_rows: self.batch.rows().to_vec(),
            search: self.list.search.clone(),
            show_table: self.list.show,
            total: self.list.certificates.len(),
            matching: filtered.len(),
            certificates: self
                .list
                .show
                .then(|| filtered.into_iter().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionStatus;
    use crate::store::MemoryStore;

    async fn dashboard() -> (Arc<MemoryStore>, AdminDashboard) {
        let store = Arc::new(MemoryStore::new());
        let dashboard = AdminDashboard::mount(store.clone(), MountFlag::mounted()).await;
        (store, dashboard)
    }

    fn fill_form(dashboard: &mut AdminDashboard, name: &str, serial: &str) {
        let example = CertificateDraft::example();
        for field in CertificateField::ALL {
            dashboard.set_form_field(field, example.get(field));
        }
        dashboard.set_form_field(CertificateField::StudentName, name);
        dashboard.set_form_field(CertificateField::SerialNumber, serial);
    }

    #[tokio::test]
    async fn created_record_is_listed_first() {
        let (_store, mut dashboard) = dashboard().await;

        fill_form(&mut dashboard, "Old", "S-1");
        dashboard.submit().await.unwrap();
        fill_form(&mut dashboard, "  New  ", "S-2");
        let notice = dashboard.submit().await.unwrap();

        assert_eq!(notice.to_string(), "Certificate created!");
        assert_eq!(dashboard.list().certificates[0].student_name, "New");
        assert_eq!(dashboard.list().certificates.len(), 2);
        assert_eq!(dashboard.form(), &CertificateForm::default());
    }

    #[tokio::test]
    async fn submit_normalizes_badge_link() {
        let (_store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Ann", "S-1");
        dashboard.set_form_field(
            CertificateField::BadgeUrl,
            "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOpQrStUvWxYz0123/view?usp=sharing",
        );
        dashboard.submit().await.unwrap();

        assert_eq!(
            dashboard.list().certificates[0].badge_url.as_deref(),
            Some("https://drive.google.com/uc?export=download&id=1AbCdEfGhIjKlMnOpQrStUvWxYz0123")
        );
    }

    #[tokio::test]
    async fn edit_updates_same_record_and_returns_to_create_mode() {
        let (store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Before", "S-1");
        dashboard.submit().await.unwrap();

        let id = dashboard.list().certificates[0].id.clone();
        dashboard.begin_edit(id.as_str()).unwrap();
        assert!(dashboard.form().is_editing());
        assert!(dashboard.form().focused);
        assert_eq!(dashboard.form().fields.student_name, "Before");

        dashboard.set_form_field(CertificateField::StudentName, "After");
        dashboard.set_form_field(CertificateField::CompletionStatus, "In Progress");
        let notice = dashboard.submit().await.unwrap();

        assert_eq!(notice, Notice::Updated);
        assert!(!dashboard.form().is_editing());
        assert_eq!(store.len().await, 1);
        let cert = &dashboard.list().certificates[0];
        assert_eq!(cert.id, id);
        assert_eq!(cert.student_name, "After");
        assert_eq!(cert.completion_status, CompletionStatus::InProgress);
    }

    #[tokio::test]
    async fn cancel_edit_clears_without_persisting() {
        let (_store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Kept", "S-1");
        dashboard.submit().await.unwrap();

        let id = dashboard.list().certificates[0].id.clone();
        dashboard.begin_edit(id.as_str()).unwrap();
        dashboard.set_form_field(CertificateField::StudentName, "Discarded");
        dashboard.cancel_edit();

        assert!(!dashboard.form().is_editing());
        dashboard.refresh().await.unwrap();
        assert_eq!(dashboard.list().certificates[0].student_name, "Kept");
    }

    #[tokio::test]
    async fn submit_failure_surfaces_message_and_keeps_form() {
        let (store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Ann", "S-1");
        store.set_write_failure(Some("duplicate key value violates unique constraint".into())).await;

        let err = dashboard.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Error: duplicate key value violates unique constraint");
        assert_eq!(dashboard.form().fields.student_name, "Ann");
    }

    #[tokio::test]
    async fn submit_requires_fields_and_email_shape() {
        let (store, mut dashboard) = dashboard().await;

        let err = dashboard.submit().await.unwrap_err();
        assert!(matches!(err, DashboardError::MissingFields(ref f) if f.len() == 5));

        fill_form(&mut dashboard, "Ann", "S-1");
        dashboard.set_form_field(CertificateField::StudentEmail, "not-an-email");
        assert!(matches!(dashboard.submit().await, Err(DashboardError::InvalidEmail(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_respects_confirmation() {
        let (_store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Ann", "S-1");
        dashboard.submit().await.unwrap();
        let id = dashboard.list().certificates[0].id.clone();

        assert_eq!(dashboard.delete(&id, &false).await.unwrap(), Notice::DeleteCancelled);
        assert_eq!(dashboard.list().certificates.len(), 1);

        assert_eq!(dashboard.delete(&id, &true).await.unwrap(), Notice::Deleted);
        assert!(dashboard.list().certificates.is_empty());
    }

    #[tokio::test]
    async fn batch_save_inserts_all_rows_and_resets() {
        let (store, mut dashboard) = dashboard().await;
        dashboard.set_batch_cell(0, CertificateField::StudentName, "Row A").unwrap();
        let second = dashboard.add_batch_row();
        dashboard.set_batch_cell(second, CertificateField::StudentName, "Row B").unwrap();
        dashboard.set_batch_cell(second, CertificateField::CompletionStatus, "").unwrap();

        assert!(matches!(
            dashboard.set_batch_cell(9, CertificateField::StudentName, "x"),
            Err(DashboardError::RowOutOfRange { index: 9, len: 2 })
        ));

        let notice = dashboard.save_batch().await.unwrap();
        assert_eq!(notice.to_string(), "Saved 2 certificates");
        assert_eq!(store.len().await, 2);
        assert_eq!(dashboard.batch(), &BatchEditor::default());
        assert!(dashboard
            .list()
            .certificates
            .iter()
            .all(|c| c.completion_status == CompletionStatus::Completed));
    }

    #[tokio::test]
    async fn batch_save_failure_keeps_rows() {
        let (store, mut dashboard) = dashboard().await;
        dashboard.add_batch_row();
        store.set_write_failure(Some("boom".into())).await;

        let err = dashboard.save_batch().await.unwrap_err();
        assert_eq!(err.to_string(), "Error saving rows: boom");
        assert_eq!(dashboard.batch().len(), 2);
    }

    #[tokio::test]
    async fn csv_import_defaults_status() {
        let (_store, mut dashboard) = dashboard().await;
        let csv = "student_name,student_email,course_name,course_duration,badge_url,serial_number\n\
                   Ann,ann@example.com,Rust,4 Weeks,,S-1\n\
                   Ben,ben@example.com,Go,2 Weeks,,S-2\n";

        let notice = dashboard.import_csv(csv.as_bytes()).await.unwrap();
        assert_eq!(notice.to_string(), "Bulk upload successful! Inserted 2 certificates");
        assert_eq!(dashboard.list().certificates.len(), 2);
        assert!(dashboard
            .list()
            .certificates
            .iter()
            .all(|c| c.completion_status == CompletionStatus::Completed && c.badge_url.is_none()));
    }

    #[tokio::test]
    async fn csv_import_rejects_unknown_status() {
        let (store, mut dashboard) = dashboard().await;
        let csv = "student_name,completion_status,serial_number\n\
                   Ann,Completed,S-1\n\
                   Ben,Faild,S-2\n\
                   Cat,Incomplete,S-3\n";

        let err = dashboard.import_csv(csv.as_bytes()).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidUploadRow(ref e) if e.row == 2));
        assert!(
            err.to_string().starts_with("Bulk upload error: row 2: unknown completion status 'Faild'"),
            "{}",
            err
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn batch_save_rejects_unknown_status() {
        let (store, mut dashboard) = dashboard().await;
        dashboard.set_batch_cell(0, CertificateField::CompletionStatus, "Incomplete").unwrap();

        let err = dashboard.save_batch().await.unwrap_err();
        assert!(err.to_string().starts_with("Error saving rows: row 1: "), "{}", err);
        assert!(store.is_empty().await);
        assert_eq!(dashboard.batch().len(), 1);
    }

    #[tokio::test]
    async fn submit_rejects_unknown_status() {
        let (store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "Ann", "S-1");
        dashboard.set_form_field(CertificateField::CompletionStatus, "Passed");

        let err = dashboard.submit().await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidStatus(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn empty_csv_inserts_nothing() {
        let (store, mut dashboard) = dashboard().await;
        store.set_write_failure(Some("should not be called".into())).await;
        let notice = dashboard.import_csv(b"student_name,serial_number\n").await.unwrap();
        assert_eq!(notice, Notice::Imported(0));
    }

    #[tokio::test]
    async fn results_after_unmount_are_dropped() {
        let (store, mut dashboard) = dashboard().await;
        dashboard.mount_flag().unmount();

        fill_form(&mut dashboard, "Late", "S-1");
        let notice = dashboard.submit().await.unwrap();

        assert_eq!(notice, Notice::Created);
        assert_eq!(store.len().await, 1);
        assert!(dashboard.list().certificates.is_empty());
        assert_eq!(dashboard.form().fields.student_name, "Late");
    }

    #[tokio::test]
    async fn snapshot_shows_table_only_on_request() {
        let (_store, mut dashboard) = dashboard().await;
        fill_form(&mut dashboard, "John Doe", "S-1");
        dashboard.submit().await.unwrap();
        fill_form(&mut dashboard, "Jane Roe", "S-2");
        dashboard.submit().await.unwrap();

        dashboard.set_search("doe");
        let hidden = dashboard.snapshot();
        assert!(hidden.certificates.is_none());
        assert_eq!(hidden.total, 2);
        assert_eq!(hidden.matching, 1);

        assert!(dashboard.toggle_visibility());
        let shown = dashboard.snapshot();
        let names: Vec<_> = shown.certificates.unwrap().into_iter().map(|c| c.student_name).collect();
        assert_eq!(names, vec!["John Doe"]);
    }
}
