use async_trait::async_trait;
use thiserror::Error;

use super::types::MedicineRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    UsernameTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only medicine lookup.
///
/// Implementations match `term` case-insensitively as a substring of the
/// name, composition or uses fields and return at most `limit` records in
/// natural row order. An empty term yields no records.
#[async_trait]
pub trait MedicineCatalog: Send + Sync {
    async fn find_medicines(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<MedicineRecord>, StoreError>;
}
