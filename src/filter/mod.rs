// Query descriptors shared by the store implementations

use crate::models::CertificateField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Ordering applied to a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }

    /// Default listing order: most recently created first
    pub fn newest_first() -> Self {
        Self::new("created_at", SortDirection::Desc)
    }

    /// PostgREST `order` parameter value, e.g. `created_at.desc`
    pub fn to_query_value(&self) -> String {
        format!("{}.{}", self.column, self.direction.as_str())
    }
}

/// Column-equals-value filter used for single-row lookups and keyed writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

impl EqFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self { column: column.into(), value: value.into() }
    }

    pub fn field(field: CertificateField, value: impl Into<String>) -> Self {
        Self::new(field.name(), value)
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new("id", id)
    }

    /// PostgREST query pair, e.g. `("serial_number", "eq.ABC123")`
    pub fn to_query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}
