use crate::error::AppError;
use crate::handlers::ListParams;
use crate::ids;
use crate::model::{Hub, HubUpdate, NewHub};
use crate::response::HubPage;
use crate::service::validation;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

fn build_hub(input: NewHub) -> Hub {
    let now = Utc::now();
    Hub {
        id: ids::hub_id(),
        name: input.name,
        code: input.code,
        address: input.address,
        city: input.city,
        state: input.state,
        pincode: input.pincode,
        phone: input.phone,
        manager: input.manager,
        capacity: input.capacity,
        current_load: 0,
        status: input.status,
        created_at: now,
        updated_at: now,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewHub>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_new_hub(&payload)?;
    let created = state.stores.hubs.create(build_hub(payload)).await?;
    tracing::info!(id = %created.id, code = %created.code, "hub created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<HubPage>, AppError> {
    let (hubs, total) = state.stores.hubs.list(params.page()).await?;
    Ok(Json(HubPage { hubs, total, skip: params.skip, limit: params.limit }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Hub>, AppError> {
    Ok(Json(state.stores.hubs.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HubUpdate>,
) -> Result<Json<Hub>, AppError> {
    Ok(Json(state.stores.hubs.update(&id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.stores.hubs.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
