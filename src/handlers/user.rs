use crate::auth;
use crate::error::AppError;
use crate::handlers::ListParams;
use crate::ids;
use crate::model::{LoginCredentials, NewUser, User, UserUpdate};
use crate::response::UserPage;
use crate::service::validation;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_new_user(&payload)?;
    let password_hash = match payload.password.as_deref() {
        Some(p) => Some(auth::hash_password(p)?),
        None => None,
    };
    let now = Utc::now();
    let user = User {
        id: ids::user_id(),
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        role: payload.role,
        password_hash,
        status: payload.status,
        created_at: now,
        updated_at: now,
    };
    let created = state.stores.users.create(user).await?;
    tracing::info!(id = %created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<UserPage>, AppError> {
    let (users, total) = state.stores.users.list(params.page()).await?;
    Ok(Json(UserPage { users, total, skip: params.skip, limit: params.limit }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.stores.users.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    // Plaintext never reaches the store.
    if let Some(password) = payload.password.take() {
        payload.password_hash = Some(auth::hash_password(&password)?);
    }
    Ok(Json(state.stores.users.update(&id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.stores.users.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Credential check. A missing account and a wrong password are
/// indistinguishable in the response.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> Result<Json<User>, AppError> {
    let user = match state.stores.users.find_by_email(&payload.email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("invalid email or password".into()))
        }
        Err(e) => return Err(e),
    };
    auth::check_login(&user, &payload.password)?;
    tracing::info!(id = %user.id, "login succeeded");
    Ok(Json(user))
}
