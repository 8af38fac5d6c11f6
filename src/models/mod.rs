pub mod certificate;
pub mod draft;

pub use certificate::{Certificate, CertificateField, CertificateId, CompletionStatus, NewCertificate, UnknownStatus};
pub use draft::{clean_rows, CertificateDraft, DraftPatch, RowError};
