//! Shared application state for all routes. Stores are injected at startup
//! so handlers never touch a concrete backend.

use crate::store::Stores;

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
}
