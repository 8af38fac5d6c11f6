// CSV template export and header-driven bulk import parsing

use serde::Deserialize;
use thiserror::Error;

use crate::models::{CertificateDraft, CertificateField};

/// File name offered for the template download
pub const TEMPLATE_FILENAME: &str = "certificates_template.csv";

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("invalid CSV: {0}")]
    Parse(#[from] csv::Error),

    #[error("could not write CSV: {0}")]
    Write(String),
}

/// One uploaded row. Columns are matched by header name; absent or unknown
/// columns are tolerated.
#[derive(Debug, Default, Deserialize)]
struct CsvRow {
    #[serde(default)]
    student_name: Option<String>,
    #[serde(default)]
    student_email: Option<String>,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    course_duration: Option<String>,
    #[serde(default)]
    completion_status: Option<String>,
    #[serde(default)]
    badge_url: Option<String>,
    #[serde(default)]
    serial_number: Option<String>,
}

impl From<CsvRow> for CertificateDraft {
    fn from(row: CsvRow) -> Self {
        // A missing status stays blank here; cleaning defaults it.
        Self {
            student_name: row.student_name.unwrap_or_default(),
            student_email: row.student_email.unwrap_or_default(),
            course_name: row.course_name.unwrap_or_default(),
            course_duration: row.course_duration.unwrap_or_default(),
            completion_status: row.completion_status.unwrap_or_default(),
            badge_url: row.badge_url.unwrap_or_default(),
            serial_number: row.serial_number.unwrap_or_default(),
        }
    }
}

/// Header row plus one example row
pub fn template() -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CertificateField::ALL.iter().map(|f| f.name()))?;

    let example = CertificateDraft::example();
    writer.write_record(CertificateField::ALL.iter().map(|f| example.get(*f)))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Write(e.to_string()))
}

/// Parse an uploaded CSV into raw drafts, one per non-empty data line
pub fn parse_drafts(input: &[u8]) -> Result<Vec<CertificateDraft>, CsvError> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let mut drafts = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        drafts.push(CertificateDraft::from(row?));
    }
    Ok(drafts)
}
