//! PostgreSQL backend. Scalar columns for queryable fields, JSONB for
//! nested documents (events, dimensions, shipment id lists), TEXT for
//! the enum vocabularies. Read-modify-write sequences run inside a
//! transaction with `SELECT ... FOR UPDATE` so the lifecycle invariant
//! holds under concurrent writers.

use crate::error::AppError;
use crate::ids;
use crate::model::{
    Dimensions, Event, EventStatus, Hub, HubStatus, HubUpdate, NewEvent, Role, Route, RouteStatus,
    RouteUpdate, ServiceType, Shipment, ShipmentUpdate, User, UserStatus, UserUpdate,
};
use crate::service::lifecycle;
use crate::store::memory::{apply_hub_update, apply_route_update, apply_user_update};
use crate::store::{HubStore, Page, RouteStore, ShipmentStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

const TRACKING_RETRIES: usize = 3;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Idempotent schema setup, run once at startup.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shipments (
            id TEXT PRIMARY KEY,
            tracking_number TEXT NOT NULL UNIQUE,
            sender_name TEXT NOT NULL,
            sender_phone TEXT,
            sender_address TEXT NOT NULL,
            receiver_name TEXT NOT NULL,
            receiver_phone TEXT,
            receiver_address TEXT NOT NULL,
            package_details TEXT NOT NULL,
            weight DOUBLE PRECISION NOT NULL,
            dimensions JSONB NOT NULL,
            service_type TEXT NOT NULL,
            cost DOUBLE PRECISION NOT NULL,
            status TEXT NOT NULL,
            pickup_date TIMESTAMPTZ,
            estimated_delivery TIMESTAMPTZ,
            actual_delivery TIMESTAMPTZ,
            route TEXT,
            hub_id TEXT,
            events JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hubs (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            pincode TEXT NOT NULL,
            phone TEXT NOT NULL,
            manager TEXT NOT NULL,
            capacity BIGINT NOT NULL,
            current_load BIGINT NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS routes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            assigned_to TEXT NOT NULL,
            hub_id TEXT NOT NULL,
            shipment_ids JSONB NOT NULL,
            estimated_distance DOUBLE PRECISION,
            estimated_time TEXT,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            role TEXT NOT NULL,
            password_hash TEXT,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn parse_enum<T>(raw: &str, parse: impl Fn(&str) -> Option<T>, what: &str) -> Result<T, AppError> {
    parse(raw).ok_or_else(|| AppError::Internal(format!("unknown {} '{}' in database", what, raw)))
}

fn from_jsonb<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("corrupt {} column: {}", what, e)))
}

fn row_to_shipment(row: &PgRow) -> Result<Shipment, AppError> {
    let service_type: String = row.try_get("service_type")?;
    let status: String = row.try_get("status")?;
    let dimensions: serde_json::Value = row.try_get("dimensions")?;
    let events: serde_json::Value = row.try_get("events")?;
    Ok(Shipment {
        id: row.try_get("id")?,
        tracking_number: row.try_get("tracking_number")?,
        sender_name: row.try_get("sender_name")?,
        sender_phone: row.try_get("sender_phone")?,
        sender_address: row.try_get("sender_address")?,
        receiver_name: row.try_get("receiver_name")?,
        receiver_phone: row.try_get("receiver_phone")?,
        receiver_address: row.try_get("receiver_address")?,
        package_details: row.try_get("package_details")?,
        weight: row.try_get("weight")?,
        dimensions: from_jsonb::<Dimensions>(dimensions, "dimensions")?,
        service_type: parse_enum(&service_type, ServiceType::parse, "service type")?,
        cost: row.try_get("cost")?,
        status: parse_enum(&status, EventStatus::parse, "status")?,
        pickup_date: row.try_get("pickup_date")?,
        estimated_delivery: row.try_get("estimated_delivery")?,
        actual_delivery: row.try_get("actual_delivery")?,
        route: row.try_get("route")?,
        hub_id: row.try_get("hub_id")?,
        events: from_jsonb::<Vec<Event>>(events, "events")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_hub(row: &PgRow) -> Result<Hub, AppError> {
    let status: String = row.try_get("status")?;
    Ok(Hub {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        pincode: row.try_get("pincode")?,
        phone: row.try_get("phone")?,
        manager: row.try_get("manager")?,
        capacity: row.try_get("capacity")?,
        current_load: row.try_get("current_load")?,
        status: parse_enum(&status, HubStatus::parse, "hub status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_route(row: &PgRow) -> Result<Route, AppError> {
    let status: String = row.try_get("status")?;
    let shipment_ids: serde_json::Value = row.try_get("shipment_ids")?;
    Ok(Route {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        assigned_to: row.try_get("assigned_to")?,
        hub_id: row.try_get("hub_id")?,
        shipment_ids: from_jsonb::<Vec<String>>(shipment_ids, "shipment_ids")?,
        estimated_distance: row.try_get("estimated_distance")?,
        estimated_time: row.try_get("estimated_time")?,
        status: parse_enum(&status, RouteStatus::parse, "route status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_user(row: &PgRow) -> Result<User, AppError> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        role: parse_enum(&role, Role::parse, "role")?,
        password_hash: row.try_get("password_hash")?,
        status: parse_enum(&status, UserStatus::parse, "user status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn to_jsonb<T: serde::Serialize>(value: &T, what: &str) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("cannot encode {}: {}", what, e)))
}

async fn insert_shipment(
    pool: &PgPool,
    s: &Shipment,
    dimensions: &serde_json::Value,
    events: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO shipments (
            id, tracking_number, sender_name, sender_phone, sender_address,
            receiver_name, receiver_phone, receiver_address, package_details,
            weight, dimensions, service_type, cost, status, pickup_date,
            estimated_delivery, actual_delivery, route, hub_id, events,
            created_at, updated_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22
        )
        "#,
    )
    .bind(&s.id)
    .bind(&s.tracking_number)
    .bind(&s.sender_name)
    .bind(&s.sender_phone)
    .bind(&s.sender_address)
    .bind(&s.receiver_name)
    .bind(&s.receiver_phone)
    .bind(&s.receiver_address)
    .bind(&s.package_details)
    .bind(s.weight)
    .bind(dimensions)
    .bind(s.service_type.as_str())
    .bind(s.cost)
    .bind(s.status.as_str())
    .bind(s.pickup_date)
    .bind(s.estimated_delivery)
    .bind(s.actual_delivery)
    .bind(&s.route)
    .bind(&s.hub_id)
    .bind(events)
    .bind(s.created_at)
    .bind(s.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Lock a shipment row for the duration of the surrounding transaction.
async fn select_shipment_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
) -> Result<Shipment, AppError> {
    let row = sqlx::query("SELECT * FROM shipments WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    match row {
        Some(row) => row_to_shipment(&row),
        None => Err(AppError::NotFound(format!("shipment '{}'", id))),
    }
}

async fn write_shipment(
    tx: &mut Transaction<'_, Postgres>,
    s: &Shipment,
) -> Result<(), AppError> {
    let dimensions = to_jsonb(&s.dimensions, "dimensions")?;
    let events = to_jsonb(&s.events, "events")?;
    sqlx::query(
        r#"
        UPDATE shipments SET
            sender_name = $2, sender_phone = $3, sender_address = $4,
            receiver_name = $5, receiver_phone = $6, receiver_address = $7,
            package_details = $8, weight = $9, dimensions = $10,
            service_type = $11, cost = $12, status = $13, pickup_date = $14,
            estimated_delivery = $15, actual_delivery = $16, route = $17,
            hub_id = $18, events = $19, updated_at = $20
        WHERE id = $1
        "#,
    )
    .bind(&s.id)
    .bind(&s.sender_name)
    .bind(&s.sender_phone)
    .bind(&s.sender_address)
    .bind(&s.receiver_name)
    .bind(&s.receiver_phone)
    .bind(&s.receiver_address)
    .bind(&s.package_details)
    .bind(s.weight)
    .bind(dimensions)
    .bind(s.service_type.as_str())
    .bind(s.cost)
    .bind(s.status.as_str())
    .bind(s.pickup_date)
    .bind(s.estimated_delivery)
    .bind(s.actual_delivery)
    .bind(&s.route)
    .bind(&s.hub_id)
    .bind(events)
    .bind(s.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl ShipmentStore for PgStore {
    async fn create(&self, mut shipment: Shipment) -> Result<Shipment, AppError> {
        let dimensions = to_jsonb(&shipment.dimensions, "dimensions")?;
        let events = to_jsonb(&shipment.events, "events")?;
        // Tracking codes are random; on the rare collision regenerate and
        // retry a bounded number of times before giving up.
        let mut attempts = 0;
        loop {
            match insert_shipment(&self.pool, &shipment, &dimensions, &events).await {
                Ok(()) => {
                    tracing::debug!(
                        id = %shipment.id,
                        tracking = %shipment.tracking_number,
                        "create shipment"
                    );
                    return Ok(shipment);
                }
                Err(e) if is_unique_violation(&e) && attempts < TRACKING_RETRIES => {
                    attempts += 1;
                    shipment.tracking_number = ids::tracking_number();
                }
                Err(e) if is_unique_violation(&e) => {
                    return Err(AppError::Conflict(
                        "could not allocate a unique tracking number".into(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn get(&self, id_or_tracking: &str) -> Result<Shipment, AppError> {
        let row = sqlx::query("SELECT * FROM shipments WHERE id = $1 OR tracking_number = $1")
            .bind(id_or_tracking)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_shipment(&row),
            None => Err(AppError::NotFound(format!("shipment '{}'", id_or_tracking))),
        }
    }

    async fn list(
        &self,
        page: Page,
        status: Option<EventStatus>,
    ) -> Result<(Vec<Shipment>, u64), AppError> {
        let status = status.map(|s| s.as_str());
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shipments WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(
            r#"
            SELECT * FROM shipments
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(status)
        .bind(page.skip as i64)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .iter()
            .map(row_to_shipment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, id: &str, update: ShipmentUpdate) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut shipment = match select_shipment_for_update(&mut tx, id).await {
            Ok(s) => s,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
        if let Err(e) = lifecycle::apply_update(&mut shipment, update, Utc::now()) {
            tx.rollback().await?;
            return Err(e);
        }
        write_shipment(&mut tx, &shipment).await?;
        tx.commit().await?;
        Ok(shipment)
    }

    async fn append_event(&self, id: &str, event: NewEvent) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut shipment = match select_shipment_for_update(&mut tx, id).await {
            Ok(s) => s,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
        let now = Utc::now();
        let event = lifecycle::resolve_event(&shipment, event, now);
        if let Err(e) = lifecycle::apply_event(&mut shipment, event, now) {
            tx.rollback().await?;
            return Err(e);
        }
        write_shipment(&mut tx, &shipment).await?;
        tx.commit().await?;
        Ok(shipment)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM shipments WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("shipment '{}'", id))),
        }
    }

    async fn all(&self) -> Result<Vec<Shipment>, AppError> {
        let rows = sqlx::query("SELECT * FROM shipments")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_shipment).collect()
    }
}

#[async_trait]
impl HubStore for PgStore {
    async fn create(&self, hub: Hub) -> Result<Hub, AppError> {
        sqlx::query(
            r#"
            INSERT INTO hubs (
                id, name, code, address, city, state, pincode, phone,
                manager, capacity, current_load, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&hub.id)
        .bind(&hub.name)
        .bind(&hub.code)
        .bind(&hub.address)
        .bind(&hub.city)
        .bind(&hub.state)
        .bind(&hub.pincode)
        .bind(&hub.phone)
        .bind(&hub.manager)
        .bind(hub.capacity)
        .bind(hub.current_load)
        .bind(hub.status.as_str())
        .bind(hub.created_at)
        .bind(hub.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(hub)
    }

    async fn get(&self, id: &str) -> Result<Hub, AppError> {
        let row = sqlx::query("SELECT * FROM hubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_hub(&row),
            None => Err(AppError::NotFound(format!("hub '{}'", id))),
        }
    }

    async fn list(&self, page: Page) -> Result<(Vec<Hub>, u64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hubs")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(
            "SELECT * FROM hubs ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2",
        )
        .bind(page.skip as i64)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_hub).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, id: &str, update: HubUpdate) -> Result<Hub, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM hubs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut hub = match row {
            Some(row) => row_to_hub(&row)?,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!("hub '{}'", id)));
            }
        };
        apply_hub_update(&mut hub, update);
        sqlx::query(
            r#"
            UPDATE hubs SET
                name = $2, code = $3, address = $4, city = $5, state = $6,
                pincode = $7, phone = $8, manager = $9, capacity = $10,
                current_load = $11, status = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(&hub.id)
        .bind(&hub.name)
        .bind(&hub.code)
        .bind(&hub.address)
        .bind(&hub.city)
        .bind(&hub.state)
        .bind(&hub.pincode)
        .bind(&hub.phone)
        .bind(&hub.manager)
        .bind(hub.capacity)
        .bind(hub.current_load)
        .bind(hub.status.as_str())
        .bind(hub.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(hub)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM hubs WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("hub '{}'", id))),
        }
    }

    async fn count(&self) -> Result<u64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hubs")
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }
}

#[async_trait]
impl RouteStore for PgStore {
    async fn create(&self, route: Route) -> Result<Route, AppError> {
        let shipment_ids = to_jsonb(&route.shipment_ids, "shipment_ids")?;
        sqlx::query(
            r#"
            INSERT INTO routes (
                id, name, description, assigned_to, hub_id, shipment_ids,
                estimated_distance, estimated_time, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&route.id)
        .bind(&route.name)
        .bind(&route.description)
        .bind(&route.assigned_to)
        .bind(&route.hub_id)
        .bind(shipment_ids)
        .bind(route.estimated_distance)
        .bind(&route.estimated_time)
        .bind(route.status.as_str())
        .bind(route.created_at)
        .bind(route.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(route)
    }

    async fn get(&self, id: &str) -> Result<Route, AppError> {
        let row = sqlx::query("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_route(&row),
            None => Err(AppError::NotFound(format!("route '{}'", id))),
        }
    }

    async fn list(&self, page: Page) -> Result<(Vec<Route>, u64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM routes")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(
            "SELECT * FROM routes ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2",
        )
        .bind(page.skip as i64)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_route).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, id: &str, update: RouteUpdate) -> Result<Route, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM routes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut route = match row {
            Some(row) => row_to_route(&row)?,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!("route '{}'", id)));
            }
        };
        apply_route_update(&mut route, update);
        let shipment_ids = to_jsonb(&route.shipment_ids, "shipment_ids")?;
        sqlx::query(
            r#"
            UPDATE routes SET
                name = $2, description = $3, assigned_to = $4, hub_id = $5,
                shipment_ids = $6, estimated_distance = $7, estimated_time = $8,
                status = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(&route.id)
        .bind(&route.name)
        .bind(&route.description)
        .bind(&route.assigned_to)
        .bind(&route.hub_id)
        .bind(shipment_ids)
        .bind(route.estimated_distance)
        .bind(&route.estimated_time)
        .bind(route.status.as_str())
        .bind(route.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(route)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM routes WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("route '{}'", id))),
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, phone, role, password_hash, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "user with email '{}' already exists",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<User, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_user(&row),
            None => Err(AppError::NotFound(format!("user '{}'", id))),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_user(&row),
            None => Err(AppError::NotFound(format!("user '{}'", email))),
        }
    }

    async fn list(&self, page: Page) -> Result<(Vec<User>, u64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2",
        )
        .bind(page.skip as i64)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut user = match row {
            Some(row) => row_to_user(&row)?,
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!("user '{}'", id)));
            }
        };
        apply_user_update(&mut user, update);
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2, email = $3, phone = $4, role = $5,
                password_hash = $6, status = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await;
        if let Err(e) = result {
            tx.rollback().await?;
            if is_unique_violation(&e) {
                return Err(AppError::Conflict(format!(
                    "user with email '{}' already exists",
                    user.email
                )));
            }
            return Err(e.into());
        }
        tx.commit().await?;
        Ok(user)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let deleted: Option<String> =
            sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("user '{}'", id))),
        }
    }
}
