use axum::{extract::State, Json};

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::ApiQuery;
use crate::state::AuthState;
use crate::types::{LenientPageQuery, Page, PageQuery};

/// GET /api/users?page=&limit= - newest first, bare page object. Bad paging
/// values fall back to the defaults.
pub async fn list(
    State(state): State<AuthState>,
    ApiQuery(raw): ApiQuery<LenientPageQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    let query = PageQuery::from(raw);
    let pagination = state.pagination.clamp(query.page, query.limit);
    let page = state.repos.users.list(pagination).await?;

    tracing::debug!(
        page = page.page,
        limit = page.limit,
        total_users = page.total,
        "Users list retrieved"
    );
    Ok(Json(page))
}
