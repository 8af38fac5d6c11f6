use crate::models::Certificate;

/// Fetched certificates plus the search box and the show/hide toggle
#[derive(Debug, Clone, Default)]
pub struct CertificateList {
    pub certificates: Vec<Certificate>,
    pub search: String,
    pub show: bool,
}

impl CertificateList {
    pub fn replace(&mut self, certificates: Vec<Certificate>) {
        self.certificates = certificates;
    }

    pub fn find(&self, id: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.id.as_str() == id)
    }

    pub fn filtered(&self) -> Vec<&Certificate> {
        filter_certificates(&self.certificates, &self.search)
    }

    pub fn toggle(&mut self) -> bool {
        self.show = !self.show;
        self.show
    }
}

/// Case-insensitive substring search over name, course and serial.
/// An empty query keeps every row.
pub fn filter_certificates<'a>(certificates: &'a [Certificate], query: &str) -> Vec<&'a Certificate> {
    let needle = query.to_lowercase();
    certificates
        .iter()
        .filter(|cert| needle.is_empty() || cert.matches_search(&needle))
        .collect()
}
