//! HTTP server entry point. Picks the PostgreSQL backend when
//! `DATABASE_URL` is set, otherwise serves from the in-memory store.

use axum::http::HeaderValue;
use axum::Router;
use bluecart::store::{ensure_tables, Stores};
use bluecart::{api_routes, common_routes, AppConfig, AppState};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bluecart=info")),
        )
        .init();

    let config = AppConfig::from_env();

    let stores = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            ensure_tables(&pool).await?;
            tracing::info!("using postgres backend");
            Stores::postgres(pool)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory backend");
            Stores::memory()
        }
    };

    let state = AppState { stores };
    let app = Router::new()
        .merge(common_routes())
        .nest("/api", api_routes(state))
        .layer(cors_layer(&config.allowed_origins));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
