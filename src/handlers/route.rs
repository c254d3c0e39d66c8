use crate::error::AppError;
use crate::handlers::ListParams;
use crate::ids;
use crate::model::{NewRoute, Route, RouteUpdate};
use crate::response::RoutePage;
use crate::service::validation;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

fn build_route(input: NewRoute) -> Route {
    let now = Utc::now();
    Route {
        id: ids::route_id(),
        name: input.name,
        description: input.description,
        assigned_to: input.assigned_to,
        hub_id: input.hub_id,
        shipment_ids: input.shipment_ids,
        estimated_distance: input.estimated_distance,
        estimated_time: input.estimated_time,
        status: input.status,
        created_at: now,
        updated_at: now,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewRoute>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_new_route(&payload)?;
    let created = state.stores.routes.create(build_route(payload)).await?;
    tracing::info!(id = %created.id, "route created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<RoutePage>, AppError> {
    let (routes, total) = state.stores.routes.list(params.page()).await?;
    Ok(Json(RoutePage { routes, total, skip: params.skip, limit: params.limit }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Route>, AppError> {
    Ok(Json(state.stores.routes.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RouteUpdate>,
) -> Result<Json<Route>, AppError> {
    Ok(Json(state.stores.routes.update(&id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.stores.routes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
