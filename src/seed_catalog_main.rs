use std::env;
use std::path::PathBuf;

use anyhow::Context;

use pharmacy_backend::catalog::{seed_if_empty, SeedOutcome, SqliteCatalogStore};
use pharmacy_backend::core::config::AppPaths;
use pharmacy_backend::core::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = AppPaths::new();
    logging::init(&paths).context("Failed to initialize logging")?;

    let csv_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.seed_csv_path.clone());

    let store = SqliteCatalogStore::new(&paths)
        .await
        .with_context(|| format!("Failed to open {}", paths.db_path.display()))?;
    tracing::info!("Connected to {}", paths.db_path.display());

    match seed_if_empty(&store, &csv_path).await {
        Ok(SeedOutcome::Inserted(count)) => {
            tracing::info!("Seeding completed. Inserted {} rows.", count);
        }
        Ok(SeedOutcome::AlreadySeeded { .. }) => {}
        Err(err) => {
            tracing::error!("Seeding failed: {}", err);
            return Err(err).context("Failed to seed medicines");
        }
    }

    Ok(())
}
