use axum::extract::State;

use crate::database::models::{Category, CategoryWithProjects, Project};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, IdPath};
use crate::state::ApiState;

/// GET /api/categories/id/:id
pub async fn get_basic(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Category> {
    let category = state
        .repos
        .categories
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(ApiResponse::success(category))
}

/// GET /api/categories/public/:id
pub async fn get_public(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> ApiResult<CategoryWithProjects> {
    let category = state
        .repos
        .categories
        .get_by_id_with_relations(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(ApiResponse::success(category))
}

/// GET /api/categories/public/:id/projects
pub async fn get_projects(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Vec<Project>> {
    if state.repos.categories.get_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }
    let projects = state.repos.projects.get_by_category_id(id).await?;
    Ok(ApiResponse::success(projects))
}
