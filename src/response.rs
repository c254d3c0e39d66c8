//! Response envelopes. List endpoints return the page plus the
//! pre-pagination total and the echo of skip/limit.

use crate::model::{Hub, Route, Shipment, User};
use serde::Serialize;

#[derive(Serialize)]
pub struct ShipmentPage {
    pub shipments: Vec<Shipment>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct HubPage {
    pub hubs: Vec<Hub>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct RoutePage {
    pub routes: Vec<Route>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
