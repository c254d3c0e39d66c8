use crate::error::AppError;
use crate::service::analytics::{self, DashboardSummary};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

/// Full rescan per request; nothing is cached between calls.
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let shipments = state.stores.shipments.all().await?;
    let total_hubs = state.stores.hubs.count().await?;
    Ok(Json(analytics::summarize(&shipments, total_hubs, Utc::now())))
}
