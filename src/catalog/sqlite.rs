//! SQLite-backed catalog store.
//!
//! One pool serves both the read-heavy medicine lookups and the rare account
//! writes. WAL journaling keeps concurrent readers independent of each other.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use super::store::{MedicineCatalog, StoreError};
use super::types::{MedicineRecord, NewMedicine, UserAccount};
use crate::core::config::AppPaths;

const MEDICINE_COLUMNS: &str = "medicine_id, name, composition, uses, side_effects, image_url, \
     manufacturer, excellent_review_pct, average_review_pct, poor_review_pct";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, StoreError> {
        Self::with_path(paths.db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS medicines (
                medicine_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                composition TEXT,
                uses TEXT,
                side_effects TEXT,
                image_url TEXT,
                manufacturer TEXT,
                excellent_review_pct REAL,
                average_review_pct REAL,
                poor_review_pct REAL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// First `limit` medicines in row order.
    pub async fn browse_medicines(&self, limit: i64) -> Result<Vec<MedicineRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM medicines ORDER BY medicine_id LIMIT ?",
            MEDICINE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_medicine).collect())
    }

    /// Catalog page lookup: every match for a non-blank term, otherwise the
    /// first `browse_limit` rows.
    pub async fn search_catalog(
        &self,
        term: Option<&str>,
        browse_limit: i64,
    ) -> Result<Vec<MedicineRecord>, StoreError> {
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => self.query_matches(term, None).await,
            None => self.browse_medicines(browse_limit).await,
        }
    }

    pub async fn medicine_count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts all records in a single transaction.
    pub async fn insert_medicines(&self, records: &[NewMedicine]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                "INSERT INTO medicines (name, composition, uses, side_effects, image_url, \
                 manufacturer, excellent_review_pct, average_review_pct, poor_review_pct) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.name)
            .bind(&record.composition)
            .bind(&record.uses)
            .bind(&record.side_effects)
            .bind(&record.image_url)
            .bind(&record.manufacturer)
            .bind(record.excellent_review_pct)
            .bind(record.average_review_pct)
            .bind(record.poor_review_pct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    pub async fn register_user(&self, username: &str, password: &str) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let duplicate = err
                    .as_database_error()
                    .map(|db_err| db_err.is_unique_violation())
                    .unwrap_or(false);
                if duplicate {
                    StoreError::UsernameTaken
                } else {
                    StoreError::Database(err)
                }
            })?;

        Ok(result.last_insert_rowid())
    }

    /// Exact match on both username and password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, username, password FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserAccount {
            id: row.try_get::<i64, _>("user_id").unwrap_or_default(),
            username: row.try_get::<String, _>("username").unwrap_or_default(),
            password: row.try_get::<String, _>("password").unwrap_or_default(),
        }))
    }

    async fn query_matches(
        &self,
        term: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MedicineRecord>, StoreError> {
        let pattern = format!("%{}%", escape_like(term));
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.unwrap_or(-1);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM medicines \
             WHERE name LIKE ? ESCAPE '\\' OR composition LIKE ? ESCAPE '\\' OR uses LIKE ? ESCAPE '\\' \
             ORDER BY medicine_id LIMIT ?",
            MEDICINE_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_medicine).collect())
    }
}

#[async_trait]
impl MedicineCatalog for SqliteCatalogStore {
    async fn find_medicines(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<MedicineRecord>, StoreError> {
        let term = term.trim();
        if term.is_empty() || limit <= 0 {
            return Ok(Vec::new());
        }
        self.query_matches(term, Some(limit)).await
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn row_to_medicine(row: &SqliteRow) -> MedicineRecord {
    let text = |column: &str| {
        row.try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .unwrap_or_default()
    };
    let pct = |column: &str| {
        row.try_get::<Option<f64>, _>(column)
            .ok()
            .flatten()
            .unwrap_or(0.0)
    };

    MedicineRecord {
        medicine_id: row.try_get::<i64, _>("medicine_id").unwrap_or_default(),
        name: text("name"),
        composition: text("composition"),
        uses: text("uses"),
        side_effects: text("side_effects"),
        image_url: text("image_url"),
        manufacturer: text("manufacturer"),
        excellent_review_pct: pct("excellent_review_pct"),
        average_review_pct: pct("average_review_pct"),
        poor_review_pct: pct("poor_review_pct"),
    }
}
