use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::session::refresh_user_count;
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, CurrentUser};
use crate::state::AuthState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
}

/// GET /api/profile
pub async fn get(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// PUT /api/profile
pub async fn update(
    State(state): State<AuthState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    Validator::new()
        .length("username", &username, 3, 50)
        .email("email", &email)
        .max_length("email", &email, 100)
        .finish()?;

    if state
        .repos
        .users
        .exists_by_email_or_username(&email, &username, user.id)
        .await?
    {
        return Err(ApiError::conflict("Username or email already exists"));
    }

    let updated = state.repos.users.update_profile(user.id, &username, &email).await?;
    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(updated))
}

/// DELETE /api/profile
pub async fn delete(
    State(state): State<AuthState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    if !state.repos.users.delete(user.id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    refresh_user_count(&state).await;
    tracing::info!(user_id = user.id, "User deleted");

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
