use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{bearer_token, Claims, JwtKeys};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AuthState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

impl AuthUser {
    /// Owner key stored on every portfolio resource
    pub fn owner_id(&self) -> String {
        self.user_id.to_string()
    }

    pub fn owns(&self, owner_id: &str) -> bool {
        self.owner_id() == owner_id
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// The caller's user row, loaded by [`current_user_middleware`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(keys): State<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let claims = keys.verify(token)?;

    tracing::debug!(user_id = claims.user_id, "Authenticated request");
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`], but also requires that the user in the token
/// still exists.
pub async fn current_user_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let claims = state.keys.verify(token)?;

    let user = match state.repos.users.get_by_id(claims.user_id).await? {
        Some(user) => user,
        None => {
            tracing::warn!(user_id = claims.user_id, "Token for deleted user");
            return Err(ApiError::unauthorized("User not found"));
        }
    };

    request.extensions_mut().insert(AuthUser::from(claims));
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
