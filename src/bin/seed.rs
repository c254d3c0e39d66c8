//! Database seeding. Generates synthetic shipments and loads them into
//! the PostgreSQL backend. `SEED_COUNT` controls the batch size.

use bluecart::fixtures;
use bluecart::service::{lifecycle, validation};
use bluecart::store::{ensure_tables, Stores};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bluecart=info")),
        )
        .init();

    let url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL must be set for seeding")?;
    let count: usize = std::env::var("SEED_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    ensure_tables(&pool).await?;
    let stores = Stores::postgres(pool);

    tracing::info!(count, "seeding shipments");
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut created = 0usize;
    for input in fixtures::generate_batch(&mut rng, count, now) {
        validation::validate_new_shipment(&input)?;
        // Backdate creation to the start of the generated history so the
        // dashboard trend spreads over real days.
        let created_at = input.events.first().map(|e| e.timestamp).unwrap_or(now);
        let shipment = lifecycle::build_shipment(input, created_at);
        stores.shipments.create(shipment).await?;
        created += 1;
        if created % 50 == 0 {
            tracing::info!(created, "progress");
        }
    }
    tracing::info!(created, "seeding complete");
    Ok(())
}
