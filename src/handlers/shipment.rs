use crate::error::AppError;
use crate::handlers::ListParams;
use crate::model::{NewEvent, NewShipment, Shipment, ShipmentUpdate};
use crate::response::ShipmentPage;
use crate::service::{lifecycle, validation};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewShipment>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_new_shipment(&payload)?;
    let shipment = lifecycle::build_shipment(payload, Utc::now());
    let created = state.stores.shipments.create(shipment).await?;
    tracing::info!(id = %created.id, tracking = %created.tracking_number, "shipment created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ShipmentPage>, AppError> {
    let (shipments, total) = state
        .stores
        .shipments
        .list(params.page(), params.status)
        .await?;
    Ok(Json(ShipmentPage {
        shipments,
        total,
        skip: params.skip,
        limit: params.limit,
    }))
}

/// Path segment accepts either the internal id or the tracking number.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state.stores.shipments.get(&id).await?;
    Ok(Json(shipment))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ShipmentUpdate>,
) -> Result<Json<Shipment>, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("no fields to update".into()));
    }
    let updated = state.stores.shipments.update(&id, payload).await?;
    Ok(Json(updated))
}

pub async fn append_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NewEvent>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.stores.shipments.append_event(&id, payload).await?;
    tracing::info!(id = %updated.id, status = %updated.status, "event appended");
    Ok((StatusCode::CREATED, Json(updated)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.stores.shipments.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
