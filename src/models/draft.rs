use serde::{Deserialize, Serialize};
use super::certificate::{Certificate, CertificateField, CompletionStatus, NewCertificate, UnknownStatus};
use crate::link::normalize_badge_url;

/// An in-progress certificate as typed into a form or a spreadsheet row.
///
/// Every cell is raw text, including the completion status, so that a row can
/// hold whatever was entered until it is cleaned for the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDraft {
    pub student_name: String,
    pub student_email: String,
    pub course_name: String,
    pub course_duration: String,
    pub completion_status: String,
    pub badge_url: String,
    pub serial_number: String,
}

impl Default for CertificateDraft {
    fn default() -> Self {
        Self {
            student_name: String::new(),
            student_email: String::new(),
            course_name: String::new(),
            course_duration: String::new(),
            completion_status: CompletionStatus::default().as_str().to_string(),
            badge_url: String::new(),
            serial_number: String::new(),
        }
    }
}

impl CertificateDraft {
    /// The sample row shipped in the CSV template
    pub fn example() -> Self {
        Self {
            student_name: "John Doe".into(),
            student_email: "john@example.com".into(),
            course_name: "React Basics".into(),
            course_duration: "4 Weeks".into(),
            completion_status: CompletionStatus::Completed.as_str().into(),
            badge_url: "https://drive.google.com/file/d/FILE_ID/view".into(),
            serial_number: "ABC123".into(),
        }
    }

    pub fn get(&self, field: CertificateField) -> &str {
        match field {
            CertificateField::StudentName => &self.student_name,
            CertificateField::StudentEmail => &self.student_email,
            CertificateField::CourseName => &self.course_name,
            CertificateField::CourseDuration => &self.course_duration,
            CertificateField::CompletionStatus => &self.completion_status,
            CertificateField::BadgeUrl => &self.badge_url,
            CertificateField::SerialNumber => &self.serial_number,
        }
    }

    pub fn field_mut(&mut self, field: CertificateField) -> &mut String {
        match field {
            CertificateField::StudentName => &mut self.student_name,
            CertificateField::StudentEmail => &mut self.student_email,
            CertificateField::CourseName => &mut self.course_name,
            CertificateField::CourseDuration => &mut self.course_duration,
            CertificateField::CompletionStatus => &mut self.completion_status,
            CertificateField::BadgeUrl => &mut self.badge_url,
            CertificateField::SerialNumber => &mut self.serial_number,
        }
    }

    pub fn set(&mut self, field: CertificateField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// Required fields that are blank once trimmed
    pub fn missing_required(&self) -> Vec<CertificateField> {
        CertificateField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.get(*field).trim().is_empty())
            .collect()
    }

    /// Trim every cell, default a blank status to `Completed` and normalize
    /// the badge link. A status that is present but unrecognized is an error.
    /// No completeness check happens here.
    pub fn clean(&self) -> Result<NewCertificate, UnknownStatus> {
        let status_cell = self.completion_status.trim();
        let completion_status = if status_cell.is_empty() {
            CompletionStatus::default()
        } else {
            status_cell.parse::<CompletionStatus>()?
        };

        let badge = self.badge_url.trim();

        Ok(NewCertificate {
            student_name: self.student_name.trim().to_string(),
            student_email: self.student_email.trim().to_string(),
            course_name: self.course_name.trim().to_string(),
            course_duration: self.course_duration.trim().to_string(),
            completion_status,
            badge_url: (!badge.is_empty()).then(|| normalize_badge_url(badge)),
            serial_number: self.serial_number.trim().to_string(),
        })
    }
}

/// A row of a batch or an upload that could not be cleaned
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row}: {source}")]
pub struct RowError {
    /// 1-based position of the row
    pub row: usize,
    #[source]
    pub source: UnknownStatus,
}

/// Clean every draft, stopping at the first row that cannot be stored
pub fn clean_rows(drafts: &[CertificateDraft]) -> Result<Vec<NewCertificate>, RowError> {
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| draft.clean().map_err(|source| RowError { row: i + 1, source }))
        .collect()
}

impl From<&Certificate> for CertificateDraft {
    fn from(cert: &Certificate) -> Self {
        Self {
            student_name: cert.student_name.clone(),
            student_email: cert.student_email.clone(),
            course_name: cert.course_name.clone(),
            course_duration: cert.course_duration.clone(),
            completion_status: cert.completion_status.as_str().to_string(),
            badge_url: cert.badge_url.clone().unwrap_or_default(),
            serial_number: cert.serial_number.clone(),
        }
    }
}

/// Partial set of cell edits, e.g. a JSON body or CLI flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftPatch {
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub course_name: Option<String>,
    pub course_duration: Option<String>,
    pub completion_status: Option<String>,
    pub badge_url: Option<String>,
    pub serial_number: Option<String>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        self.changes().next().is_none()
    }

    pub fn changes(&self) -> impl Iterator<Item = (CertificateField, &str)> {
        [
            (CertificateField::StudentName, &self.student_name),
            (CertificateField::StudentEmail, &self.student_email),
            (CertificateField::CourseName, &self.course_name),
            (CertificateField::CourseDuration, &self.course_duration),
            (CertificateField::CompletionStatus, &self.completion_status),
            (CertificateField::BadgeUrl, &self.badge_url),
            (CertificateField::SerialNumber, &self.serial_number),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }

    pub fn apply_to(&self, draft: &mut CertificateDraft) {
        for (field, value) in self.changes() {
            draft.set(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_draft_defaults_status_to_completed() {
        let draft = CertificateDraft::default();
        assert_eq!(draft.completion_status, "Completed");
        assert_eq!(draft.missing_required().len(), 5);
    }

    #[test]
    fn clean_trims_cells_and_normalizes_badge() {
        let draft = CertificateDraft {
            student_name: "  Jane Roe ".into(),
            student_email: " jane@example.com".into(),
            course_name: "Go ".into(),
            course_duration: " 2 Weeks".into(),
            completion_status: "  ".into(),
            badge_url: " https://drive.google.com/file/d/1AbCdEfGhIjKlMnOpQrStUvWxYz/view ".into(),
            serial_number: " XYZ9 ".into(),
        };

        let cleaned = draft.clean().unwrap();
        assert_eq!(cleaned.student_name, "Jane Roe");
        assert_eq!(cleaned.serial_number, "XYZ9");
        assert_eq!(cleaned.completion_status, CompletionStatus::Completed);
        assert_eq!(
            cleaned.badge_url.as_deref(),
            Some("https://drive.google.com/uc?export=download&id=1AbCdEfGhIjKlMnOpQrStUvWxYz")
        );
    }

    #[test]
    fn clean_keeps_incomplete_rows() {
        let mut draft = CertificateDraft::default();
        draft.set(CertificateField::SerialNumber, "ONLY-SERIAL");

        let cleaned = draft.clean().unwrap();
        assert_eq!(cleaned.student_name, "");
        assert_eq!(cleaned.serial_number, "ONLY-SERIAL");
        assert!(cleaned.badge_url.is_none());
    }

    #[test]
    fn clean_rejects_unrecognized_status() {
        let mut draft = CertificateDraft::example();
        draft.set(CertificateField::CompletionStatus, " Faild ");

        let err = draft.clean().unwrap_err();
        assert_eq!(err, UnknownStatus("Faild".into()));

        draft.set(CertificateField::CompletionStatus, "in progress");
        assert_eq!(draft.clean().unwrap().completion_status, CompletionStatus::InProgress);
    }

    #[test]
    fn clean_rows_reports_first_bad_row() {
        let good = CertificateDraft::example();
        let mut bad = CertificateDraft::example();
        bad.set(CertificateField::CompletionStatus, "Incomplete");

        let err = clean_rows(&[good.clone(), bad, good]).unwrap_err();
        assert_eq!(err.row, 2);
        assert!(err.to_string().starts_with("row 2: unknown completion status 'Incomplete'"));
    }

    #[test]
    fn set_touches_exactly_one_field() {
        let mut draft = CertificateDraft::example();
        let before = draft.clone();
        draft.set(CertificateField::CourseName, "Elixir");

        for field in CertificateField::ALL {
            if field == CertificateField::CourseName {
                assert_eq!(draft.get(field), "Elixir");
            } else {
                assert_eq!(draft.get(field), before.get(field));
            }
        }
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let patch = DraftPatch {
            course_duration: Some("8 Weeks".into()),
            ..Default::default()
        };
        let mut draft = CertificateDraft::example();
        patch.apply_to(&mut draft);

        assert_eq!(draft.course_duration, "8 Weeks");
        assert_eq!(draft.student_name, "John Doe");
        assert!(!patch.is_empty());
        assert!(DraftPatch::default().is_empty());
    }
}
