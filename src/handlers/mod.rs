//! HTTP handlers. Thin orchestration only: decode, validate, call the
//! store, wrap the response. Business rules live in the service layer.

pub mod analytics;
pub mod hub;
pub mod route;
pub mod shipment;
pub mod user;

use serde::Deserialize;

fn default_limit() -> u64 {
    100
}

/// Common list query string: `?skip=&limit=&status=`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub status: Option<crate::model::EventStatus>,
}

impl ListParams {
    pub fn page(&self) -> crate::store::Page {
        crate::store::Page { skip: self.skip, limit: self.limit }
    }
}
