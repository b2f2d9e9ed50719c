//! Catalog store: medicine records and user accounts.
//!
//! - `MedicineCatalog`: the lookup seam the chat pipeline depends on
//! - `SqliteCatalogStore`: pooled SQLite implementation plus account operations
//! - `seed`: one-shot CSV import used by the `seed_catalog` binary

mod seed;
mod sqlite;
mod store;
mod types;

pub use seed::{read_medicines_csv, seed_if_empty, SeedError, SeedOutcome};
pub use sqlite::SqliteCatalogStore;
pub use store::{MedicineCatalog, StoreError};
pub use types::{MedicineRecord, NewMedicine, UserAccount};
