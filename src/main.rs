use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use pharmacy_backend::core::config::AppPaths;
use pharmacy_backend::core::logging;
use pharmacy_backend::server;
use pharmacy_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths).context("Failed to initialize logging")?;

    let state = AppState::initialize(paths)
        .await
        .context("Failed to initialize application state")?;

    match state.catalog.medicine_count().await {
        Ok(0) => tracing::warn!("Medicine catalog is empty; run `seed_catalog` to import it"),
        Ok(count) => tracing::info!(count, "Medicine catalog loaded"),
        Err(e) => tracing::warn!("Failed to count medicines: {}", e),
    }

    let bind_addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Server running on http://{}", addr);

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
