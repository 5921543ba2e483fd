use axum::extract::State;
use serde::Deserialize;

use crate::database::models::Project;
use crate::error::ApiError;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult, IdPath};
use crate::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct SkillsQuery {
    /// Comma-separated list
    pub skills: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    pub client: Option<String>,
}

fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// GET /api/projects/public/:id
pub async fn get_public(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Project> {
    let project = state
        .repos
        .projects
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(ApiResponse::success(project))
}

/// GET /api/projects/category/:id
pub async fn by_category(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Vec<Project>> {
    let projects = state.repos.projects.get_by_category_id(id).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/search/skills?skills=rust,sql - projects sharing any
/// of the listed skills
pub async fn search_by_skills(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SkillsQuery>,
) -> ApiResult<Vec<Project>> {
    let skills = parse_skills(query.skills.as_deref().unwrap_or_default());
    if skills.is_empty() {
        return Err(ApiError::bad_request("Skills parameter is required"));
    }
    let projects = state.repos.projects.get_by_skills(&skills).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/search/client?client=acme
pub async fn search_by_client(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ClientQuery>,
) -> ApiResult<Vec<Project>> {
    let client = query.client.as_deref().map(str::trim).unwrap_or_default();
    if client.is_empty() {
        return Err(ApiError::bad_request("Client parameter is required"));
    }
    let projects = state.repos.projects.get_by_client(client).await?;
    Ok(ApiResponse::success(projects))
}
