//! In-memory backend. One `RwLock`-guarded map per aggregate; the map
//! lock is the mutual-exclusion boundary for concurrent handlers, so
//! read-modify-write sequences never interleave.

use crate::error::AppError;
use crate::ids;
use crate::model::{
    EventStatus, Hub, HubUpdate, NewEvent, Route, RouteUpdate, Shipment, ShipmentUpdate, User,
    UserUpdate,
};
use crate::service::lifecycle;
use crate::store::{paginate, HubStore, Page, RouteStore, ShipmentStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct MemoryStore {
    shipments: RwLock<HashMap<String, Shipment>>,
    hubs: RwLock<HashMap<String, Hub>>,
    routes: RwLock<HashMap<String, Route>>,
    users: RwLock<HashMap<String, User>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read()
        .map_err(|_| AppError::Internal("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write()
        .map_err(|_| AppError::Internal("store lock poisoned".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, id as the tie-break so paging is stable.
fn sort_newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, String)) {
    items.sort_by(|a, b| {
        let (ta, ia) = key(a);
        let (tb, ib) = key(b);
        tb.cmp(&ta).then_with(|| ib.cmp(&ia))
    });
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn create(&self, mut shipment: Shipment) -> Result<Shipment, AppError> {
        let mut map = write(&self.shipments)?;
        // Tracking numbers are a hard uniqueness invariant here too, not
        // just in the relational backend.
        while map.values().any(|s| s.tracking_number == shipment.tracking_number) {
            shipment.tracking_number = ids::tracking_number();
        }
        tracing::debug!(id = %shipment.id, tracking = %shipment.tracking_number, "create shipment");
        map.insert(shipment.id.clone(), shipment.clone());
        Ok(shipment)
    }

    async fn get(&self, id_or_tracking: &str) -> Result<Shipment, AppError> {
        let map = read(&self.shipments)?;
        if let Some(s) = map.get(id_or_tracking) {
            return Ok(s.clone());
        }
        map.values()
            .find(|s| s.tracking_number == id_or_tracking)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("shipment '{}'", id_or_tracking)))
    }

    async fn list(
        &self,
        page: Page,
        status: Option<EventStatus>,
    ) -> Result<(Vec<Shipment>, u64), AppError> {
        let map = read(&self.shipments)?;
        let mut items: Vec<Shipment> = map
            .values()
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        drop(map);
        sort_newest_first(&mut items, |s| (s.created_at, s.id.clone()));
        Ok(paginate(items, page))
    }

    async fn update(&self, id: &str, update: ShipmentUpdate) -> Result<Shipment, AppError> {
        let mut map = write(&self.shipments)?;
        let shipment = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("shipment '{}'", id)))?;
        lifecycle::apply_update(shipment, update, Utc::now())?;
        Ok(shipment.clone())
    }

    async fn append_event(&self, id: &str, event: NewEvent) -> Result<Shipment, AppError> {
        let mut map = write(&self.shipments)?;
        let shipment = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("shipment '{}'", id)))?;
        let now = Utc::now();
        let event = lifecycle::resolve_event(shipment, event, now);
        lifecycle::apply_event(shipment, event, now)?;
        Ok(shipment.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut map = write(&self.shipments)?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("shipment '{}'", id)))
    }

    async fn all(&self) -> Result<Vec<Shipment>, AppError> {
        Ok(read(&self.shipments)?.values().cloned().collect())
    }
}

#[async_trait]
impl HubStore for MemoryStore {
    async fn create(&self, hub: Hub) -> Result<Hub, AppError> {
        let mut map = write(&self.hubs)?;
        map.insert(hub.id.clone(), hub.clone());
        Ok(hub)
    }

    async fn get(&self, id: &str) -> Result<Hub, AppError> {
        read(&self.hubs)?
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("hub '{}'", id)))
    }

    async fn list(&self, page: Page) -> Result<(Vec<Hub>, u64), AppError> {
        let mut items: Vec<Hub> = read(&self.hubs)?.values().cloned().collect();
        sort_newest_first(&mut items, |h| (h.created_at, h.id.clone()));
        Ok(paginate(items, page))
    }

    async fn update(&self, id: &str, update: HubUpdate) -> Result<Hub, AppError> {
        let mut map = write(&self.hubs)?;
        let hub = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("hub '{}'", id)))?;
        apply_hub_update(hub, update);
        Ok(hub.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut map = write(&self.hubs)?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("hub '{}'", id)))
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(read(&self.hubs)?.len() as u64)
    }
}

#[async_trait]
impl RouteStore for MemoryStore {
    async fn create(&self, route: Route) -> Result<Route, AppError> {
        let mut map = write(&self.routes)?;
        map.insert(route.id.clone(), route.clone());
        Ok(route)
    }

    async fn get(&self, id: &str) -> Result<Route, AppError> {
        read(&self.routes)?
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("route '{}'", id)))
    }

    async fn list(&self, page: Page) -> Result<(Vec<Route>, u64), AppError> {
        let mut items: Vec<Route> = read(&self.routes)?.values().cloned().collect();
        sort_newest_first(&mut items, |r| (r.created_at, r.id.clone()));
        Ok(paginate(items, page))
    }

    async fn update(&self, id: &str, update: RouteUpdate) -> Result<Route, AppError> {
        let mut map = write(&self.routes)?;
        let route = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("route '{}'", id)))?;
        apply_route_update(route, update);
        Ok(route.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut map = write(&self.routes)?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("route '{}'", id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let mut map = write(&self.users)?;
        map.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<User, AppError> {
        read(&self.users)?
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        read(&self.users)?
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", email)))
    }

    async fn list(&self, page: Page) -> Result<(Vec<User>, u64), AppError> {
        let mut items: Vec<User> = read(&self.users)?.values().cloned().collect();
        sort_newest_first(&mut items, |u| (u.created_at, u.id.clone()));
        Ok(paginate(items, page))
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, AppError> {
        let mut map = write(&self.users)?;
        let user = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))?;
        apply_user_update(user, update);
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut map = write(&self.users)?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))
    }
}

pub(crate) fn apply_hub_update(hub: &mut Hub, update: HubUpdate) {
    if let Some(v) = update.name {
        hub.name = v;
    }
    if let Some(v) = update.code {
        hub.code = v;
    }
    if let Some(v) = update.address {
        hub.address = v;
    }
    if let Some(v) = update.city {
        hub.city = v;
    }
    if let Some(v) = update.state {
        hub.state = v;
    }
    if let Some(v) = update.pincode {
        hub.pincode = v;
    }
    if let Some(v) = update.phone {
        hub.phone = v;
    }
    if let Some(v) = update.manager {
        hub.manager = v;
    }
    if let Some(v) = update.capacity {
        hub.capacity = v;
    }
    if let Some(v) = update.current_load {
        hub.current_load = v;
    }
    if let Some(v) = update.status {
        hub.status = v;
    }
    hub.updated_at = Utc::now();
}

pub(crate) fn apply_route_update(route: &mut Route, update: RouteUpdate) {
    if let Some(v) = update.name {
        route.name = v;
    }
    if let Some(v) = update.description {
        route.description = Some(v);
    }
    if let Some(v) = update.assigned_to {
        route.assigned_to = v;
    }
    if let Some(v) = update.hub_id {
        route.hub_id = v;
    }
    if let Some(v) = update.shipment_ids {
        route.shipment_ids = v;
    }
    if let Some(v) = update.estimated_distance {
        route.estimated_distance = Some(v);
    }
    if let Some(v) = update.estimated_time {
        route.estimated_time = Some(v);
    }
    if let Some(v) = update.status {
        route.status = v;
    }
    route.updated_at = Utc::now();
}

pub(crate) fn apply_user_update(user: &mut User, update: UserUpdate) {
    if let Some(v) = update.name {
        user.name = v;
    }
    if let Some(v) = update.email {
        user.email = v;
    }
    if let Some(v) = update.phone {
        user.phone = Some(v);
    }
    if let Some(v) = update.role {
        user.role = v;
    }
    if let Some(v) = update.status {
        user.status = v;
    }
    if let Some(v) = update.password_hash {
        user.password_hash = Some(v);
    }
    user.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, NewShipment, ServiceType};
    use chrono::Duration;

    fn new_shipment(cost: f64) -> Shipment {
        lifecycle::build_shipment(
            NewShipment {
                sender_name: "Mumbai Traders Co.".into(),
                sender_phone: None,
                sender_address: "Mumbai".into(),
                receiver_name: "Delhi Electronics Hub".into(),
                receiver_phone: None,
                receiver_address: "Delhi".into(),
                package_details: "Electronics".into(),
                weight: 2.0,
                dimensions: Dimensions { length: 10.0, width: 10.0, height: 10.0 },
                service_type: ServiceType::Standard,
                cost,
                pickup_date: None,
                estimated_delivery: None,
                actual_delivery: None,
                route: None,
                hub_id: None,
                events: Vec::new(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn get_falls_back_to_tracking_number() {
        let store = MemoryStore::new();
        let created = ShipmentStore::create(&store, new_shipment(100.0)).await.unwrap();
        let by_id = ShipmentStore::get(&store, &created.id).await.unwrap();
        let by_tracking = ShipmentStore::get(&store, &created.tracking_number).await.unwrap();
        assert_eq!(by_id.id, by_tracking.id);
    }

    #[tokio::test]
    async fn delete_is_not_found_after_first_delete() {
        let store = MemoryStore::new();
        let created = ShipmentStore::create(&store, new_shipment(50.0)).await.unwrap();
        ShipmentStore::delete(&store, &created.id).await.unwrap();
        let again = ShipmentStore::delete(&store, &created.id).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_pagination_matches_sorted_slice() {
        let store = MemoryStore::new();
        for i in 0..10 {
            let mut s = new_shipment(10.0 * i as f64);
            s.created_at = Utc::now() - Duration::minutes(i);
            ShipmentStore::create(&store, s).await.unwrap();
        }
        let (all, total) = ShipmentStore::list(&store, Page { skip: 0, limit: 100 }, None)
            .await
            .unwrap();
        assert_eq!(total, 10);
        for (skip, limit) in [(0u64, 3u64), (3, 3), (8, 5), (12, 3)] {
            let (slice, t) = ShipmentStore::list(&store, Page { skip, limit }, None)
                .await
                .unwrap();
            assert_eq!(t, 10);
            let expected: Vec<&str> = all
                .iter()
                .skip(skip as usize)
                .take(limit as usize)
                .map(|s| s.id.as_str())
                .collect();
            let got: Vec<&str> = slice.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(got, expected);
        }
    }

    #[tokio::test]
    async fn list_filters_by_status_before_counting() {
        let store = MemoryStore::new();
        for _ in 0..4 {
            ShipmentStore::create(&store, new_shipment(10.0)).await.unwrap();
        }
        let created = ShipmentStore::create(&store, new_shipment(10.0)).await.unwrap();
        ShipmentStore::update(
            &store,
            &created.id,
            ShipmentUpdate { status: Some(EventStatus::Delivered), ..Default::default() },
        )
        .await
        .unwrap();
        let (delivered, total) = ShipmentStore::list(
            &store,
            Page::default(),
            Some(EventStatus::Delivered),
        )
        .await
        .unwrap();
        assert_eq!(total, 1);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id, created.id);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let store = MemoryStore::new();
        let created = ShipmentStore::create(&store, new_shipment(75.0)).await.unwrap();
        let before = created.updated_at;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let updated = ShipmentStore::update(
            &store,
            &created.id,
            ShipmentUpdate { cost: Some(80.0), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(updated.updated_at > before);
        assert_eq!(updated.cost, 80.0);
    }
}
