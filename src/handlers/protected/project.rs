use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{ensure_owner, optional_text, pagination, track};
use crate::database::models::{NewProject, Project};
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult, AuthUser, IdPath, PagedResponse, PagedResult};
use crate::state::ApiState;
use crate::types::PageQuery;

const ENTITY: &str = "project";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub main_image: Option<String>,
    pub skills: Vec<String>,
    pub client: Option<String>,
    pub link: Option<String>,
    pub category_id: i64,
    pub position: Option<i32>,
}

/// Omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub skills: Option<Vec<String>>,
    pub client: Option<String>,
    pub link: Option<String>,
    pub position: Option<i32>,
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

async fn owned_project(state: &ApiState, user: &AuthUser, id: i64) -> Result<Project, ApiError> {
    let project = state
        .repos
        .projects
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    ensure_owner(user, &project.owner_id, ENTITY)?;
    Ok(project)
}

/// GET /api/projects/own
pub async fn list_own(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> PagedResult<Project> {
    let page = state
        .repos
        .projects
        .get_by_owner(&user.owner_id(), pagination(&state, &query))
        .await?;
    Ok(PagedResponse::new(page))
}

/// GET /api/projects/own/:id
pub async fn get_own(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Project> {
    let project = owned_project(&state, &user, id).await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects/own
pub async fn create(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<Project> {
    let metrics = state.metrics.clone();
    let result = async move {
        Validator::new()
            .required("title", &req.title)
            .max_length("title", req.title.trim(), 255)
            .required("description", &req.description)
            .positive_id("category_id", req.category_id)
            .non_negative("position", req.position)
            .finish()?;

        let category = state
            .repos
            .categories
            .get_by_id(req.category_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        ensure_owner(&user, &category.owner_id, "category")?;

        let title = req.title.trim().to_string();
        if state
            .repos
            .projects
            .check_duplicate(&title, category.id, 0)
            .await?
        {
            return Err(ApiError::conflict(
                "Project with this title already exists in the category",
            ));
        }

        let position = match req.position {
            Some(position) => position,
            None => state.repos.projects.next_position(category.id).await?,
        };

        let project = state
            .repos
            .projects
            .create(NewProject {
                title,
                description: req.description.trim().to_string(),
                images: clean_list(req.images),
                main_image: optional_text(req.main_image),
                skills: clean_list(req.skills),
                client: optional_text(req.client),
                link: optional_text(req.link),
                position,
                category_id: category.id,
                owner_id: user.owner_id(),
            })
            .await?;

        tracing::info!(project_id = project.id, category_id = category.id, "Project created");
        Ok::<_, ApiError>(ApiResponse::created(project).with_message("Project created successfully"))
    }
    .await;

    track(&metrics, ENTITY, "create", result).await
}

/// PUT /api/projects/own/:id
pub async fn update(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<Project> {
    let metrics = state.metrics.clone();
    let result = async move {
        let mut validator = Validator::new();
        if let Some(title) = &req.title {
            validator
                .required("title", title)
                .max_length("title", title.trim(), 255);
        }
        if let Some(description) = &req.description {
            validator.required("description", description);
        }
        validator.non_negative("position", req.position).finish()?;

        let mut project = owned_project(&state, &user, id).await?;

        if let Some(title) = req.title {
            let title = title.trim().to_string();
            if title != project.title
                && state
                    .repos
                    .projects
                    .check_duplicate(&title, project.category_id, id)
                    .await?
            {
                return Err(ApiError::conflict(
                    "Project with this title already exists in the category",
                ));
            }
            project.title = title;
        }
        if let Some(description) = req.description {
            project.description = description.trim().to_string();
        }
        if let Some(images) = req.images {
            project.images = clean_list(images);
        }
        if req.main_image.is_some() {
            project.main_image = optional_text(req.main_image);
        }
        if let Some(skills) = req.skills {
            project.skills = clean_list(skills);
        }
        if req.client.is_some() {
            project.client = optional_text(req.client);
        }
        if req.link.is_some() {
            project.link = optional_text(req.link);
        }
        if let Some(position) = req.position {
            project.position = position;
        }

        let updated = state.repos.projects.update(&project).await?;
        tracing::info!(project_id = id, "Project updated");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Project updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update", result).await
}

/// DELETE /api/projects/own/:id
pub async fn delete(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Value> {
    let metrics = state.metrics.clone();
    let result = async move {
        owned_project(&state, &user, id).await?;
        state.repos.projects.delete(id).await?;

        tracing::info!(project_id = id, "Project deleted");
        Ok::<_, ApiError>(ApiResponse::success(Value::Null).with_message("Project deleted successfully"))
    }
    .await;

    track(&metrics, ENTITY, "delete", result).await
}
