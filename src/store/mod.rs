// store/mod.rs - access to the hosted `certificates` table
//
// Every read and write goes through the CertificateStore trait. RestStore talks
// to the hosted table API; MemoryStore keeps rows in-process for development
// and tests.

pub mod error;
pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{StoreBackend, StoreConfig};
use crate::filter::{EqFilter, OrderBy};
use crate::models::{Certificate, CertificateId, NewCertificate};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::{RestAuthenticator, RestStore};

#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// All rows in the given order
    async fn select_all(&self, order: &OrderBy) -> Result<Vec<Certificate>, StoreError>;

    /// Exactly one row matching the filter; zero or several rows is an error
    async fn select_single(&self, filter: &EqFilter) -> Result<Certificate, StoreError>;

    /// Insert one or many rows in a single request
    async fn insert(&self, rows: &[NewCertificate]) -> Result<Vec<Certificate>, StoreError>;

    /// Replace the business fields of the row with this identifier
    async fn update(&self, id: &CertificateId, row: &NewCertificate) -> Result<(), StoreError>;

    async fn delete(&self, id: &CertificateId) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Build the store selected by configuration
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn CertificateStore>, StoreError> {
    match config.backend {
        StoreBackend::Rest => {
            let store = RestStore::new(config)?;
            info!("Using hosted certificate store at {}", store.table_url());
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            if crate::is_production!() {
                warn!("In-memory certificate store selected in production; records are lost on restart");
            } else {
                info!("Using in-memory certificate store");
            }
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
