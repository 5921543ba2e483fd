use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::middleware::AuthUser;
use crate::types::{PageQuery, Pagination};
use crate::state::ApiState;

/// 403 unless `user` owns the resource
pub fn ensure_owner(user: &AuthUser, owner_id: &str, entity: &str) -> Result<(), ApiError> {
    if user.owns(owner_id) {
        Ok(())
    } else {
        tracing::warn!(user_id = user.user_id, entity, "Ownership check failed");
        Err(ApiError::forbidden(format!(
            "You do not have permission to modify this {}",
            entity
        )))
    }
}

/// Count the outcome of a write in `crud_operations_total` and pass it through.
pub async fn track<T>(
    metrics: &Metrics,
    entity: &str,
    operation: &str,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics.record_crud(entity, operation, status).await;
    result
}

pub fn pagination(state: &ApiState, query: &PageQuery) -> Pagination {
    state.pagination.clamp(query.page, query.limit)
}

/// Trimmed copy, or `None` for blank input
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
