use serde::Serialize;

use crate::models::{clean_rows, CertificateDraft, CertificateField, NewCertificate, RowError};

/// Spreadsheet-style editor holding an ordered list of unsaved rows.
/// Never empty: it starts with, and resets to, one blank row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEditor {
    rows: Vec<CertificateDraft>,
}

impl Default for BatchEditor {
    fn default() -> Self {
        Self {
            rows: vec![CertificateDraft::default()],
        }
    }
}

impl BatchEditor {
    pub fn rows(&self) -> &[CertificateDraft] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a blank row and return its index
    pub fn add_row(&mut self) -> usize {
        self.rows.push(CertificateDraft::default());
        self.rows.len() - 1
    }

    /// Update one field of one row. `false` if the row does not exist.
    pub fn set_cell(&mut self, index: usize, field: CertificateField, value: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Every row trimmed and normalized, in order. Blank required cells pass
    /// through; an unrecognized status does not.
    pub fn cleaned(&self) -> Result<Vec<NewCertificate>, RowError> {
        clean_rows(&self.rows)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
