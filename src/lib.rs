//! BlueCart ERP backend: shipment tracking, hubs, routes, users, and a
//! dashboard aggregator, served over a JSON HTTP API with an in-memory
//! or PostgreSQL store behind one trait surface.

pub mod auth;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod ids;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::{api_routes, common_routes};
pub use state::AppState;
pub use store::Stores;
