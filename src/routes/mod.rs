//! Route tables. The API surface is mounted under `/api`; the root and
//! health probes live outside it.

use crate::handlers;
use crate::response::HealthBody;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

async fn root() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        message: "BlueCart ERP backend",
        timestamp: Utc::now(),
    })
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        message: "service is running",
        timestamp: Utc::now(),
    })
}

pub fn common_routes() -> Router {
    Router::new().route("/", get(root)).route("/health", get(health))
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/shipments", get(handlers::shipment::list).post(handlers::shipment::create))
        .route(
            "/shipments/:id",
            get(handlers::shipment::get)
                .put(handlers::shipment::update)
                .delete(handlers::shipment::delete),
        )
        .route("/shipments/:id/events", post(handlers::shipment::append_event))
        .route("/hubs", get(handlers::hub::list).post(handlers::hub::create))
        .route(
            "/hubs/:id",
            get(handlers::hub::get)
                .put(handlers::hub::update)
                .delete(handlers::hub::delete),
        )
        .route("/routes", get(handlers::route::list).post(handlers::route::create))
        .route(
            "/routes/:id",
            get(handlers::route::get)
                .put(handlers::route::update)
                .delete(handlers::route::delete),
        )
        .route("/users", get(handlers::user::list).post(handlers::user::create))
        .route(
            "/users/:id",
            get(handlers::user::get)
                .put(handlers::user::update)
                .delete(handlers::user::delete),
        )
        .route("/auth/login", post(handlers::user::login))
        .route("/analytics/dashboard", get(handlers::analytics::dashboard))
        .with_state(state)
}
