//! Seeds market signals and stores into the dashboard database.
//!
//! Run with:
//! ```
//! cargo run -p market-seed --bin seed
//! ```
//!
//! Reads `DATABASE_URL` for a direct Postgres connection, otherwise
//! `NEXT_PUBLIC_SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`. Values in
//! `.env.local` and `.env` are picked up when present.

use market_seed::config::{Backend, SeedConfig};
use market_seed::db::Seeder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SeedConfig::from_env()?;
    let seeder = Seeder::from_config(&config).await?;

    match &config.backend {
        Backend::Rest { url, .. } => tracing::info!("Writing to {}", url),
        Backend::Postgres { .. } => tracing::info!("Connected to database"),
    }

    let mut rng = rand::thread_rng();
    let report = seeder.run(&mut rng).await?;

    tracing::info!("Seed completed!");
    tracing::info!("  Market signals: {}", report.signals.len());
    tracing::info!("  Stores: {}", report.stores);
    tracing::info!("Refresh the dashboard to see the new data.");

    Ok(())
}
