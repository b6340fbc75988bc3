use std::path::Path;
use storefront::{
    config::{catalog, database},
    core::product::seed_catalog,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenvy::dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the catalog on first run
    let catalog_path = catalog::get_catalog_path();
    if Path::new(&catalog_path).exists() {
        let seed = catalog::load_catalog(&catalog_path)?;
        let created = seed_catalog(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
        info!("Catalog ready ({} products seeded from {})", created, catalog_path);
    } else {
        warn!("No catalog file at {}, skipping seed", catalog_path);
    }

    db.close().await?;
    Ok(())
}
