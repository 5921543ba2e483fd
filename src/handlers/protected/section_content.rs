use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{ensure_owner, optional_text, track};
use crate::database::models::{ContentType, NewSectionContent, SectionContent};
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser, IdPath};
use crate::state::ApiState;

const ENTITY: &str = "section_content";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateContentRequest {
    pub section_id: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    pub order: Option<i32>,
    pub metadata: Option<String>,
}

/// Omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContentRequest {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub content: Option<String>,
    pub order: Option<i32>,
    pub metadata: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOrderRequest {
    pub order: Option<i32>,
}

const DUPLICATE_ORDER: &str = "Content with this order already exists in the section";

fn check_content_type(validator: &mut Validator, value: &str) -> Option<ContentType> {
    let parsed = value.parse::<ContentType>().ok();
    validator.check(parsed.is_some(), "type", "type must be one of: text, image");
    parsed
}

async fn owned_content(state: &ApiState, user: &AuthUser, id: i64) -> Result<SectionContent, ApiError> {
    let content = state
        .repos
        .contents
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    ensure_owner(user, &content.owner_id, "content")?;
    Ok(content)
}

async fn ensure_order_free(state: &ApiState, section_id: i64, order: i32, exclude_id: i64) -> Result<(), ApiError> {
    if state
        .repos
        .contents
        .check_duplicate_order(section_id, order, exclude_id)
        .await?
    {
        return Err(ApiError::conflict(DUPLICATE_ORDER));
    }
    Ok(())
}

/// POST /api/section-contents/own
pub async fn create(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateContentRequest>,
) -> ApiResult<SectionContent> {
    let metrics = state.metrics.clone();
    let result = async move {
        let mut validator = Validator::new();
        let content_type = check_content_type(&mut validator, &req.content_type);
        validator
            .positive_id("section_id", req.section_id)
            .required("content", &req.content)
            .non_negative("order", req.order)
            .finish()?;
        let content_type = content_type.ok_or_else(|| ApiError::bad_request("Invalid content type"))?;

        let section = state
            .repos
            .sections
            .get_by_id(req.section_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Section not found"))?;
        ensure_owner(&user, &section.owner_id, "section")?;

        let order = match req.order {
            Some(order) => {
                ensure_order_free(&state, section.id, order, 0).await?;
                order
            }
            None => state.repos.contents.next_order(section.id).await?,
        };

        let content = state
            .repos
            .contents
            .create(NewSectionContent {
                section_id: section.id,
                content_type,
                content: req.content,
                order,
                metadata: optional_text(req.metadata),
                owner_id: user.owner_id(),
            })
            .await?;

        tracing::info!(content_id = content.id, section_id = section.id, "Section content created");
        Ok::<_, ApiError>(ApiResponse::created(content).with_message("Content created successfully"))
    }
    .await;

    track(&metrics, ENTITY, "create", result).await
}

/// PUT /api/section-contents/own/:id
pub async fn update(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateContentRequest>,
) -> ApiResult<SectionContent> {
    let metrics = state.metrics.clone();
    let result = async move {
        let mut validator = Validator::new();
        let content_type = req
            .content_type
            .as_deref()
            .and_then(|value| check_content_type(&mut validator, value));
        if let Some(content) = &req.content {
            validator.required("content", content);
        }
        validator.non_negative("order", req.order).finish()?;

        let mut content = owned_content(&state, &user, id).await?;

        if let Some(order) = req.order {
            if order != content.order {
                ensure_order_free(&state, content.section_id, order, id).await?;
            }
            content.order = order;
        }
        if let Some(content_type) = content_type {
            content.content_type = content_type.to_string();
        }
        if let Some(body) = req.content {
            content.content = body;
        }
        if req.metadata.is_some() {
            content.metadata = optional_text(req.metadata);
        }

        let updated = state.repos.contents.update(&content).await?;
        tracing::info!(content_id = id, "Section content updated");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Content updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update", result).await
}

/// PATCH /api/section-contents/own/:id/order
pub async fn update_order(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateOrderRequest>,
) -> ApiResult<SectionContent> {
    let metrics = state.metrics.clone();
    let result = async move {
        Validator::new()
            .check(req.order.is_some(), "order", "order is required")
            .non_negative("order", req.order)
            .finish()?;
        let order = req.order.unwrap_or_default();

        let content = owned_content(&state, &user, id).await?;
        if order != content.order {
            ensure_order_free(&state, content.section_id, order, id).await?;
        }

        let updated = state.repos.contents.update_order(id, order).await?;
        tracing::info!(content_id = id, order, "Section content reordered");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Content order updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update_order", result).await
}

/// DELETE /api/section-contents/own/:id
pub async fn delete(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Value> {
    let metrics = state.metrics.clone();
    let result = async move {
        owned_content(&state, &user, id).await?;
        state.repos.contents.delete(id).await?;

        tracing::info!(content_id = id, "Section content deleted");
        Ok::<_, ApiError>(ApiResponse::success(Value::Null).with_message("Content deleted successfully"))
    }
    .await;

    track(&metrics, ENTITY, "delete", result).await
}
