use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::database::models::{NewUser, User};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::metrics::Metrics;
use crate::middleware::ApiJson;
use crate::state::AuthState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Logged and counted in `authentication_attempts_total{type,status}`
async fn reject(metrics: &Metrics, kind: &str, status: &str, err: ApiError) -> ApiError {
    tracing::warn!(attempt = kind, status, reason = err.message(), "Authentication attempt rejected");
    metrics.record_auth_attempt(kind, status).await;
    err
}

pub(crate) async fn refresh_user_count(state: &AuthState) {
    match state.repos.users.count().await {
        Ok(count) => state.metrics.set_active_users(count).await,
        Err(e) => tracing::warn!(error = %e, "Failed to refresh active user count"),
    }
}

/// bcrypt is CPU-bound; keep it off the async workers.
async fn hash_off_thread(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to hash password")
        })?
        .map_err(ApiError::from)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    const KIND: &str = "register";
    let metrics = state.metrics.as_ref();

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    if let Err(err) = Validator::new()
        .length("username", &username, 3, 50)
        .email("email", &email)
        .max_length("email", &email, 100)
        .check(req.password.chars().count() >= 6, "password", "password must be at least 6 characters")
        .finish()
    {
        return Err(reject(metrics, KIND, "validation_error", err).await);
    }

    let taken = match state.repos.users.exists_by_email_or_username(&email, &username, 0).await {
        Ok(taken) => taken,
        Err(e) => return Err(reject(metrics, KIND, "db_error", e.into()).await),
    };
    if taken {
        let err = ApiError::conflict("User with this email or username already exists");
        return Err(reject(metrics, KIND, "user_exists", err).await);
    }

    let password_hash = match hash_off_thread(req.password, state.bcrypt_cost).await {
        Ok(hash) => hash,
        Err(err) => return Err(reject(metrics, KIND, "hash_error", err).await),
    };

    let user = match state
        .repos
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(e @ DatabaseError::UniqueViolation(_)) => {
            return Err(reject(metrics, KIND, "user_exists", e.into()).await)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create user");
            let err = ApiError::internal_server_error("Failed to create user");
            return Err(reject(metrics, KIND, "db_error", err).await);
        }
    };

    let token = match state.keys.issue(user.id) {
        Ok(token) => token,
        Err(e) => return Err(reject(metrics, KIND, "token_error", e.into()).await),
    };

    metrics.record_auth_attempt(KIND, "success").await;
    metrics.record_token(KIND).await;
    refresh_user_count(&state).await;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    const KIND: &str = "login";
    let metrics = state.metrics.as_ref();
    let email = req.email.trim().to_string();

    if let Err(err) = Validator::new()
        .email("email", &email)
        .required("password", &req.password)
        .finish()
    {
        return Err(reject(metrics, KIND, "validation_error", err).await);
    }

    let user = match state.repos.users.get_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let err = ApiError::unauthorized("Invalid credentials");
            return Err(reject(metrics, KIND, "user_not_found", err).await);
        }
        Err(e) => return Err(reject(metrics, KIND, "db_error", e.into()).await),
    };

    let password = req.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false);
    if !matches {
        let err = ApiError::unauthorized("Invalid credentials");
        return Err(reject(metrics, KIND, "invalid_password", err).await);
    }

    let token = match state.keys.issue(user.id) {
        Ok(token) => token,
        Err(e) => return Err(reject(metrics, KIND, "token_error", e.into()).await),
    };

    metrics.record_auth_attempt(KIND, "success").await;
    metrics.record_token(KIND).await;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}
