use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{ensure_owner, optional_text, pagination, track};
use crate::database::models::{NewSection, Section};
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult, AuthUser, IdPath, PagedResponse, PagedResult};
use crate::state::ApiState;
use crate::types::PageQuery;

const ENTITY: &str = "section";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSectionRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub section_type: String,
    pub portfolio_id: i64,
    pub position: Option<i32>,
}

/// Omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub section_type: Option<String>,
    pub position: Option<i32>,
}

async fn owned_section(state: &ApiState, user: &AuthUser, id: i64) -> Result<Section, ApiError> {
    let section = state
        .repos
        .sections
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Section not found"))?;
    ensure_owner(user, &section.owner_id, ENTITY)?;
    Ok(section)
}

/// GET /api/sections/own
pub async fn list_own(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> PagedResult<Section> {
    let page = state
        .repos
        .sections
        .get_by_owner(&user.owner_id(), pagination(&state, &query))
        .await?;
    Ok(PagedResponse::new(page))
}

/// POST /api/sections/own
pub async fn create(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateSectionRequest>,
) -> ApiResult<Section> {
    let metrics = state.metrics.clone();
    let result = async move {
        Validator::new()
            .required("title", &req.title)
            .max_length("title", req.title.trim(), 255)
            .required("type", &req.section_type)
            .max_length("type", req.section_type.trim(), 50)
            .positive_id("portfolio_id", req.portfolio_id)
            .non_negative("position", req.position)
            .finish()?;

        let portfolio = state
            .repos
            .portfolios
            .get_by_id_basic(req.portfolio_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
        ensure_owner(&user, &portfolio.owner_id, "portfolio")?;

        let title = req.title.trim().to_string();
        if state
            .repos
            .sections
            .check_duplicate(&title, portfolio.id, 0)
            .await?
        {
            return Err(ApiError::conflict(
                "Section with this title already exists in the portfolio",
            ));
        }

        let position = match req.position {
            Some(position) => position,
            None => state.repos.sections.next_position(portfolio.id).await?,
        };

        let section = state
            .repos
            .sections
            .create(NewSection {
                title,
                description: optional_text(req.description),
                section_type: req.section_type.trim().to_string(),
                position,
                portfolio_id: portfolio.id,
                owner_id: user.owner_id(),
            })
            .await?;

        tracing::info!(section_id = section.id, portfolio_id = portfolio.id, "Section created");
        Ok::<_, ApiError>(ApiResponse::created(section).with_message("Section created successfully"))
    }
    .await;

    track(&metrics, ENTITY, "create", result).await
}

/// PUT /api/sections/own/:id
pub async fn update(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateSectionRequest>,
) -> ApiResult<Section> {
    let metrics = state.metrics.clone();
    let result = async move {
        let mut validator = Validator::new();
        if let Some(title) = &req.title {
            validator
                .required("title", title)
                .max_length("title", title.trim(), 255);
        }
        if let Some(section_type) = &req.section_type {
            validator
                .required("type", section_type)
                .max_length("type", section_type.trim(), 50);
        }
        validator.non_negative("position", req.position).finish()?;

        let mut section = owned_section(&state, &user, id).await?;

        if let Some(title) = req.title {
            let title = title.trim().to_string();
            if title != section.title
                && state
                    .repos
                    .sections
                    .check_duplicate(&title, section.portfolio_id, id)
                    .await?
            {
                return Err(ApiError::conflict(
                    "Section with this title already exists in the portfolio",
                ));
            }
            section.title = title;
        }
        if req.description.is_some() {
            section.description = optional_text(req.description);
        }
        if let Some(section_type) = req.section_type {
            section.section_type = section_type.trim().to_string();
        }
        if let Some(position) = req.position {
            section.position = position;
        }

        let updated = state.repos.sections.update(&section).await?;
        tracing::info!(section_id = id, "Section updated");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Section updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update", result).await
}

/// DELETE /api/sections/own/:id
pub async fn delete(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Value> {
    let metrics = state.metrics.clone();
    let result = async move {
        owned_section(&state, &user, id).await?;
        state.repos.sections.delete(id).await?;

        tracing::info!(section_id = id, "Section deleted");
        Ok::<_, ApiError>(ApiResponse::success(Value::Null).with_message("Section deleted successfully"))
    }
    .await;

    track(&metrics, ENTITY, "delete", result).await
}
