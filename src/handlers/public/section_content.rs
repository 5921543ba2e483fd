use axum::extract::State;

use crate::database::models::SectionContent;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, IdPath};
use crate::state::ApiState;

/// GET /api/section-contents/:id
pub async fn get(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<SectionContent> {
    let content = state
        .repos
        .contents
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    Ok(ApiResponse::success(content))
}
