//! One-shot import of `Medicine_Details.csv` into an empty catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::sqlite::SqliteCatalogStore;
use super::store::StoreError;
use super::types::NewMedicine;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("CSV file not found at {0}")]
    MissingFile(PathBuf),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    AlreadySeeded { existing: i64 },
    Inserted(usize),
}

#[derive(Debug, Deserialize)]
struct CsvMedicineRow {
    #[serde(rename = "Medicine Name", default)]
    name: String,
    #[serde(rename = "Composition", default)]
    composition: String,
    #[serde(rename = "Uses", default)]
    uses: String,
    #[serde(rename = "Side_effects", default)]
    side_effects: String,
    #[serde(rename = "Image URL", default)]
    image_url: String,
    #[serde(rename = "Manufacturer", default)]
    manufacturer: String,
    #[serde(rename = "Excellent Review %", default)]
    excellent_review_pct: String,
    #[serde(rename = "Average Review %", default)]
    average_review_pct: String,
    #[serde(rename = "Poor Review %", default)]
    poor_review_pct: String,
}

impl From<CsvMedicineRow> for NewMedicine {
    fn from(row: CsvMedicineRow) -> Self {
        NewMedicine {
            name: row.name,
            composition: row.composition,
            uses: row.uses,
            side_effects: row.side_effects,
            image_url: row.image_url,
            manufacturer: row.manufacturer,
            excellent_review_pct: parse_percentage(&row.excellent_review_pct),
            average_review_pct: parse_percentage(&row.average_review_pct),
            poor_review_pct: parse_percentage(&row.poor_review_pct),
        }
    }
}

pub fn read_medicines_csv(path: &Path) -> Result<Vec<NewMedicine>, SeedError> {
    if !path.exists() {
        return Err(SeedError::MissingFile(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut medicines: Vec<NewMedicine> = Vec::new();
    for row in reader.deserialize::<CsvMedicineRow>() {
        medicines.push(row?.into());
    }
    Ok(medicines)
}

/// Imports the CSV unless the medicines table already holds rows.
pub async fn seed_if_empty(
    store: &SqliteCatalogStore,
    csv_path: &Path,
) -> Result<SeedOutcome, SeedError> {
    let existing = store.medicine_count().await?;
    if existing > 0 {
        tracing::info!(existing, "Medicines table already has data, skipping seed");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    tracing::info!("Seeding medicines from {}", csv_path.display());
    let path = csv_path.to_path_buf();
    let medicines = tokio::task::spawn_blocking(move || read_medicines_csv(&path)).await??;

    let inserted = store.insert_medicines(&medicines).await?;
    tracing::info!(inserted, "Seeding completed");
    Ok(SeedOutcome::Inserted(inserted))
}

/// Longest numeric prefix, so `"45.5%"` → 45.5, `"1e2"` → 100 and
/// `"1.2.3"` → 1.2; anything without one → 0.
fn parse_percentage(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let candidate_len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    let candidate = &trimmed[..candidate_len];

    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Medicine Name,Composition,Uses,Side_effects,Image URL,Manufacturer,Excellent Review %,Average Review %,Poor Review %";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    async fn test_store() -> SqliteCatalogStore {
        let tmp = std::env::temp_dir().join(format!("pharmacy-seed-test-{}.db", uuid::Uuid::new_v4()));
        SqliteCatalogStore::with_path(tmp).await.unwrap()
    }

    #[test]
    fn parse_percentage_reads_longest_numeric_prefix() {
        assert_eq!(parse_percentage("45"), 45.0);
        assert_eq!(parse_percentage(" 12.5% "), 12.5);
        assert_eq!(parse_percentage(""), 0.0);
        assert_eq!(parse_percentage("n/a"), 0.0);
        assert_eq!(parse_percentage("1.2.3"), 1.2);
        assert_eq!(parse_percentage("1e2"), 100.0);
        assert_eq!(parse_percentage("7e%"), 7.0);
        assert_eq!(parse_percentage("-3.5 pts"), -3.5);
    }

    #[test]
    fn reads_rows_with_quoted_fields() {
        let file = write_csv(&[
            "Avastin 400mg Injection,Bevacizumab (400mg),\"Cancer of colon, rectum\",Rectal bleeding,https://img/1.jpg,Roche,22,56,22",
            "Augmentin 625,Amoxycillin (500mg),Bacterial infections,Vomiting,https://img/2.jpg,GSK,,bad,10",
        ]);

        let rows = read_medicines_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].uses, "Cancer of colon, rectum");
        assert_eq!(rows[0].excellent_review_pct, 22.0);
        assert_eq!(rows[1].excellent_review_pct, 0.0);
        assert_eq!(rows[1].average_review_pct, 0.0);
        assert_eq!(rows[1].poor_review_pct, 10.0);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_medicines_csv(Path::new("/nonexistent/Medicine_Details.csv")).unwrap_err();
        assert!(matches!(err, SeedError::MissingFile(_)));
    }

    #[tokio::test]
    async fn seeds_once_then_skips() {
        let store = test_store().await;
        let file = write_csv(&["Dolo 650,Paracetamol (650mg),Fever,Nausea,https://img/3.jpg,Micro Labs,60,30,10"]);

        let first = seed_if_empty(&store, file.path()).await.unwrap();
        assert_eq!(first, SeedOutcome::Inserted(1));

        let second = seed_if_empty(&store, file.path()).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadySeeded { existing: 1 });
        assert_eq!(store.medicine_count().await.unwrap(), 1);
    }
}
