//! Store abstraction. One async trait per aggregate, injected into
//! handlers through `AppState`; backends are the in-process map and
//! PostgreSQL.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::model::{
    EventStatus, Hub, HubUpdate, NewEvent, Route, RouteUpdate, Shipment, ShipmentUpdate, User,
    UserUpdate,
};
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use postgres::{ensure_tables, PgStore};

/// Offset/limit pagination over creation-time-descending order.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Persist a freshly built record. The store owns tracking-number
    /// uniqueness and may regenerate the code on collision.
    async fn create(&self, shipment: Shipment) -> Result<Shipment, AppError>;
    /// Lookup by id, falling back to tracking number.
    async fn get(&self, id_or_tracking: &str) -> Result<Shipment, AppError>;
    /// Page sorted by creation time descending; also returns the
    /// pre-pagination total.
    async fn list(
        &self,
        page: Page,
        status: Option<EventStatus>,
    ) -> Result<(Vec<Shipment>, u64), AppError>;
    async fn update(&self, id: &str, update: ShipmentUpdate) -> Result<Shipment, AppError>;
    /// Append a lifecycle event and recompute derived fields atomically.
    async fn append_event(&self, id: &str, event: NewEvent) -> Result<Shipment, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Snapshot of every shipment, for the analytics scan.
    async fn all(&self) -> Result<Vec<Shipment>, AppError>;
}

#[async_trait]
pub trait HubStore: Send + Sync {
    async fn create(&self, hub: Hub) -> Result<Hub, AppError>;
    async fn get(&self, id: &str) -> Result<Hub, AppError>;
    async fn list(&self, page: Page) -> Result<(Vec<Hub>, u64), AppError>;
    async fn update(&self, id: &str, update: HubUpdate) -> Result<Hub, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn create(&self, route: Route) -> Result<Route, AppError>;
    async fn get(&self, id: &str) -> Result<Route, AppError>;
    async fn list(&self, page: Page) -> Result<(Vec<Route>, u64), AppError>;
    async fn update(&self, id: &str, update: RouteUpdate) -> Result<Route, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<User, AppError>;
    async fn get(&self, id: &str) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn list(&self, page: Page) -> Result<(Vec<User>, u64), AppError>;
    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// The injected bundle of stores. Both backends implement every trait on
/// one struct, so construction is a matter of cloning the Arc.
#[derive(Clone)]
pub struct Stores {
    pub shipments: Arc<dyn ShipmentStore>,
    pub hubs: Arc<dyn HubStore>,
    pub routes: Arc<dyn RouteStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            shipments: store.clone(),
            hubs: store.clone(),
            routes: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            shipments: store.clone(),
            hubs: store.clone(),
            routes: store.clone(),
            users: store,
        }
    }
}

/// Slice `[skip, skip+limit)` out of an already-sorted vec, preserving
/// the pre-pagination total.
pub(crate) fn paginate<T>(mut items: Vec<T>, page: Page) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let skip = page.skip.min(total) as usize;
    let end = (page.skip.saturating_add(page.limit)).min(total) as usize;
    items.drain(..skip);
    items.truncate(end - skip);
    (items, total)
}
