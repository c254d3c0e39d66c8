//! Domain services: request validation, shipment lifecycle, analytics.

pub mod analytics;
pub mod lifecycle;
pub mod validation;
