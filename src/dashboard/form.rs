use serde::Serialize;

use crate::models::{Certificate, CertificateDraft, CertificateField, CertificateId};

/// The single-record create/update form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CertificateForm {
    /// Identifier of the record being edited; `None` in create mode
    pub id: Option<CertificateId>,
    pub fields: CertificateDraft,
    /// Set when an edit begins so the view brings the form into focus
    pub focused: bool,
}

impl CertificateForm {
    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn set(&mut self, field: CertificateField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    pub fn load(&mut self, cert: &Certificate) {
        self.id = Some(cert.id.clone());
        self.fields = CertificateDraft::from(cert);
        self.focused = true;
    }

    /// Back to an empty create-mode form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Loose shape check standing in for the browser's email input type:
/// something before and after a single `@`, and a dot in the domain.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
