// verify/mod.rs - public certificate lookup by serial number

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::EqFilter;
use crate::models::{Certificate, CertificateField};
use crate::store::CertificateStore;

pub const NOT_FOUND_MESSAGE: &str = "No certificate found for this serial number.";

/// Footer line of the public page
pub fn footer_text() -> String {
    format!("Awareness Paradigm Verification © {}", Utc::now().year())
}

/// What the public page shows for a verified certificate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateCard {
    pub student_name: String,
    pub course_name: String,
    pub course_duration: String,
    pub serial_number: String,
    pub completion_status: String,
    pub badge_download_url: Option<String>,
}

impl From<&Certificate> for CertificateCard {
    fn from(cert: &Certificate) -> Self {
        Self {
            student_name: cert.student_name.clone(),
            course_name: cert.course_name.clone(),
            course_duration: cert.course_duration.clone(),
            serial_number: cert.serial_number.clone(),
            completion_status: cert.completion_status.to_string(),
            badge_download_url: cert.badge_download_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    Idle,
    Verified { card: CertificateCard },
    NotFound { error: String },
}

/// State of the public verification form
pub struct VerificationLookup {
    store: Arc<dyn CertificateStore>,
    serial: String,
    card: Option<CertificateCard>,
    error: Option<String>,
}

impl VerificationLookup {
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        Self {
            store,
            serial: String::new(),
            card: None,
            error: None,
        }
    }

    /// Input is kept verbatim; whitespace is significant to the lookup
    pub fn set_serial(&mut self, serial: impl Into<String>) {
        self.serial = serial.into();
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Query for exactly one certificate with this serial. Any store error,
    /// including zero or duplicate matches, reads as "not found".
    pub async fn verify(&mut self) -> VerifyOutcome {
        self.card = None;
        self.error = None;

        let filter = EqFilter::field(CertificateField::SerialNumber, self.serial.clone());
        match self.store.select_single(&filter).await {
            Ok(cert) => {
                info!(serial = %cert.serial_number, "certificate verified");
                self.card = Some(CertificateCard::from(&cert));
            }
            Err(e) => {
                debug!(serial = %self.serial, "verification lookup failed: {}", e);
                self.error = Some(NOT_FOUND_MESSAGE.to_string());
            }
        }

        self.outcome()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn card(&self) -> Option<&CertificateCard> {
        self.card.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn outcome(&self) -> VerifyOutcome {
        match (&self.card, &self.error) {
            (Some(card), _) => VerifyOutcome::Verified { card: card.clone() },
            (None, Some(error)) => VerifyOutcome::NotFound { error: error.clone() },
            (None, None) => VerifyOutcome::Idle,
        }
    }
}
