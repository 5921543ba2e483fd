use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{Section, SectionContent, SectionWithContents};
use crate::error::ApiError;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult, IdPath};
use crate::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub section_type: Option<String>,
}

/// GET /api/sections/public/:id
pub async fn get_public(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> ApiResult<SectionWithContents> {
    let section = state
        .repos
        .sections
        .get_by_id_with_relations(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Section not found"))?;
    Ok(ApiResponse::success(section))
}

/// GET /api/sections/portfolio/:id
pub async fn by_portfolio(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Vec<Section>> {
    let sections = state.repos.sections.get_by_portfolio_id(id).await?;
    Ok(ApiResponse::success(sections))
}

/// GET /api/sections/type?type=about
pub async fn by_type(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<TypeQuery>,
) -> ApiResult<Vec<Section>> {
    let section_type = query.section_type.as_deref().map(str::trim).unwrap_or_default();
    if section_type.is_empty() {
        return Err(ApiError::bad_request("Type parameter is required"));
    }
    let sections = state.repos.sections.get_by_type(section_type).await?;
    Ok(ApiResponse::success(sections))
}

/// GET /api/sections/:id/contents
pub async fn contents(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Vec<SectionContent>> {
    if state.repos.sections.get_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Section not found"));
    }
    let contents = state.repos.contents.get_by_section_id(id).await?;
    Ok(ApiResponse::success(contents))
}
