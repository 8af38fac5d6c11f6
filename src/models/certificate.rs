use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::link::normalize_badge_url;

/// Store-assigned record identifier. Opaque to this application: the hosted
/// table may hand out UUIDs or integers, both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CertificateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

/// Completion state of a certificate as stored in the `completion_status` column.
///
/// Rows written by other clients may carry spellings this application never
/// produces; those are kept verbatim in `Other` instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CompletionStatus {
    #[default]
    Completed,
    InProgress,
    Failed,
    Other(String),
}

impl CompletionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CompletionStatus::Completed => "Completed",
            CompletionStatus::InProgress => "In Progress",
            CompletionStatus::Failed => "Failed",
            CompletionStatus::Other(raw) => raw,
        }
    }

    /// Accepts spreadsheet spellings such as `completed`, `in-progress` or `IN_PROGRESS`.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let folded: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "completed" => Some(CompletionStatus::Completed),
            "inprogress" => Some(CompletionStatus::InProgress),
            "failed" => Some(CompletionStatus::Failed),
            _ => None,
        }
    }

    /// Status read back from the store: lenient, and never an error
    pub fn from_stored(raw: &str) -> Self {
        Self::parse_lenient(raw).unwrap_or_else(|| {
            warn!(status = raw, "unrecognized stored completion status, keeping raw value");
            CompletionStatus::Other(raw.to_string())
        })
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CompletionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CompletionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            None | Some("") => CompletionStatus::default(),
            Some(raw) => CompletionStatus::from_stored(raw),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown completion status '{0}' (expected Completed, In Progress or Failed)")]
pub struct UnknownStatus(pub String);

impl FromStr for CompletionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The seven business columns of a certificate, in CSV header order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateField {
    StudentName,
    StudentEmail,
    CourseName,
    CourseDuration,
    CompletionStatus,
    BadgeUrl,
    SerialNumber,
}

impl CertificateField {
    pub const ALL: [CertificateField; 7] = [
        CertificateField::StudentName,
        CertificateField::StudentEmail,
        CertificateField::CourseName,
        CertificateField::CourseDuration,
        CertificateField::CompletionStatus,
        CertificateField::BadgeUrl,
        CertificateField::SerialNumber,
    ];

    /// Column name in the store and in the CSV header
    pub fn name(&self) -> &'static str {
        match self {
            CertificateField::StudentName => "student_name",
            CertificateField::StudentEmail => "student_email",
            CertificateField::CourseName => "course_name",
            CertificateField::CourseDuration => "course_duration",
            CertificateField::CompletionStatus => "completion_status",
            CertificateField::BadgeUrl => "badge_url",
            CertificateField::SerialNumber => "serial_number",
        }
    }

    /// Human label used as a table heading
    pub fn label(&self) -> &'static str {
        match self {
            CertificateField::StudentName => "Student Name",
            CertificateField::StudentEmail => "Email",
            CertificateField::CourseName => "Course",
            CertificateField::CourseDuration => "Duration",
            CertificateField::CompletionStatus => "Status",
            CertificateField::BadgeUrl => "Badge URL",
            CertificateField::SerialNumber => "Serial",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, CertificateField::BadgeUrl)
    }
}

impl fmt::Display for CertificateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CertificateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CertificateField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown certificate field '{}'", s))
    }
}

/// A certificate row as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub student_name: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub student_email: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub course_name: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub course_duration: String,
    #[serde(default)]
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub badge_url: Option<String>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub serial_number: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Text value of a business column
    pub fn text(&self, field: CertificateField) -> &str {
        match field {
            CertificateField::StudentName => &self.student_name,
            CertificateField::StudentEmail => &self.student_email,
            CertificateField::CourseName => &self.course_name,
            CertificateField::CourseDuration => &self.course_duration,
            CertificateField::CompletionStatus => self.completion_status.as_str(),
            CertificateField::BadgeUrl => self.badge_url.as_deref().unwrap_or(""),
            CertificateField::SerialNumber => &self.serial_number,
        }
    }

    /// Direct-download form of the badge link, if the record has one
    pub fn badge_download_url(&self) -> Option<String> {
        self.badge_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(normalize_badge_url)
    }

    /// Case-insensitive substring match over name, course and serial.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        [&self.student_name, &self.course_name, &self.serial_number]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

/// Insert/update payload: a cleaned certificate without store-assigned columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCertificate {
    pub student_name: String,
    pub student_email: String,
    pub course_name: String,
    pub course_duration: String,
    pub completion_status: CompletionStatus,
    pub badge_url: Option<String>,
    pub serial_number: String,
}

impl NewCertificate {
    pub fn into_certificate(self, id: CertificateId, created_at: DateTime<Utc>) -> Certificate {
        Certificate {
            id,
            student_name: self.student_name,
            student_email: self.student_email,
            course_name: self.course_name,
            course_duration: self.course_duration,
            completion_status: self.completion_status,
            badge_url: self.badge_url,
            serial_number: self.serial_number,
            created_at: Some(created_at),
        }
    }
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_store_row_with_numeric_id_and_nulls() {
        let cert: Certificate = serde_json::from_value(json!({
            "id": 42,
            "student_name": "John Doe",
            "student_email": null,
            "course_name": "React Basics",
            "course_duration": "4 Weeks",
            "completion_status": "In Progress",
            "badge_url": null,
            "serial_number": "ABC123",
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }))
        .unwrap();

        assert_eq!(cert.id.as_str(), "42");
        assert_eq!(cert.student_email, "");
        assert_eq!(cert.completion_status, CompletionStatus::InProgress);
        assert!(cert.badge_url.is_none());
        assert!(cert.created_at.is_some());
    }

    #[test]
    fn stored_status_is_read_leniently() {
        let row = |status: serde_json::Value| {
            serde_json::from_value::<Certificate>(json!({
                "id": "c-1",
                "serial_number": "ABC123",
                "completion_status": status
            }))
        };

        assert_eq!(row(json!("completed")).unwrap().completion_status, CompletionStatus::Completed);
        assert_eq!(row(json!("IN_PROGRESS")).unwrap().completion_status, CompletionStatus::InProgress);
        assert_eq!(row(json!(null)).unwrap().completion_status, CompletionStatus::Completed);

        let odd = row(json!("Audited")).unwrap();
        assert_eq!(odd.completion_status, CompletionStatus::Other("Audited".into()));
        assert_eq!(json!(odd.completion_status), json!("Audited"));
    }

    #[test]
    fn status_serializes_with_display_spelling() {
        assert_eq!(json!(CompletionStatus::InProgress), json!("In Progress"));
        assert_eq!(CompletionStatus::parse_lenient("in_progress"), Some(CompletionStatus::InProgress));
        assert_eq!(CompletionStatus::parse_lenient(" FAILED"), Some(CompletionStatus::Failed));
        assert!("Passed".parse::<CompletionStatus>().is_err());
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in CertificateField::ALL {
            assert_eq!(field.name().parse::<CertificateField>(), Ok(field));
        }
        assert!("id".parse::<CertificateField>().is_err());
        assert!(!CertificateField::BadgeUrl.is_required());
        assert!(CertificateField::SerialNumber.is_required());
    }

    #[test]
    fn search_matches_name_course_and_serial_only() {
        let cert = NewCertificate {
            student_name: "John Doe".into(),
            student_email: "doe@example.com".into(),
            course_name: "Rust 101".into(),
            course_duration: "6 Weeks".into(),
            completion_status: CompletionStatus::Completed,
            badge_url: None,
            serial_number: "SN-77".into(),
        }
        .into_certificate(CertificateId::new("1"), Utc::now());

        assert!(cert.matches_search("doe"));
        assert!(cert.matches_search("rust"));
        assert!(cert.matches_search("sn-7"));
        assert!(!cert.matches_search("example.com"));
    }
}
