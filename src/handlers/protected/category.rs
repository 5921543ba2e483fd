use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{ensure_owner, optional_text, pagination, track};
use crate::database::models::{Category, NewCategory};
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult, AuthUser, IdPath, PagedResponse, PagedResult};
use crate::state::ApiState;
use crate::types::PageQuery;

const ENTITY: &str = "category";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryRequest {
    pub title: String,
    pub description: Option<String>,
    pub portfolio_id: i64,
    pub position: Option<i32>,
}

/// Omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

async fn owned_category(state: &ApiState, user: &AuthUser, id: i64) -> Result<Category, ApiError> {
    let category = state
        .repos
        .categories
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    ensure_owner(user, &category.owner_id, ENTITY)?;
    Ok(category)
}

/// GET /api/categories/own
pub async fn list_own(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> PagedResult<Category> {
    let page = state
        .repos
        .categories
        .get_by_owner(&user.owner_id(), pagination(&state, &query))
        .await?;
    Ok(PagedResponse::new(page))
}

/// POST /api/categories/own
pub async fn create(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> ApiResult<Category> {
    let metrics = state.metrics.clone();
    let result = async move {
        Validator::new()
            .required("title", &req.title)
            .max_length("title", req.title.trim(), 255)
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
            .categories
            .check_duplicate(&title, portfolio.id, 0)
            .await?
        {
            return Err(ApiError::conflict(
                "Category with this title already exists in the portfolio",
            ));
        }

        let position = match req.position {
            Some(position) => position,
            None => state.repos.categories.next_position(portfolio.id).await?,
        };

        let category = state
            .repos
            .categories
            .create(NewCategory {
                title,
                description: optional_text(req.description),
                position,
                portfolio_id: portfolio.id,
                owner_id: user.owner_id(),
            })
            .await?;

        tracing::info!(category_id = category.id, portfolio_id = portfolio.id, "Category created");
        Ok::<_, ApiError>(ApiResponse::created(category).with_message("Category created successfully"))
    }
    .await;

    track(&metrics, ENTITY, "create", result).await
}

/// PUT /api/categories/own/:id
pub async fn update(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    let metrics = state.metrics.clone();
    let result = async move {
        let mut validator = Validator::new();
        if let Some(title) = &req.title {
            validator
                .required("title", title)
                .max_length("title", title.trim(), 255);
        }
        validator.non_negative("position", req.position).finish()?;

        let mut category = owned_category(&state, &user, id).await?;

        if let Some(title) = req.title {
            let title = title.trim().to_string();
            if title != category.title
                && state
                    .repos
                    .categories
                    .check_duplicate(&title, category.portfolio_id, id)
                    .await?
            {
                return Err(ApiError::conflict(
                    "Category with this title already exists in the portfolio",
                ));
            }
            category.title = title;
        }
        if req.description.is_some() {
            category.description = optional_text(req.description);
        }
        if let Some(position) = req.position {
            category.position = position;
        }

        let updated = state.repos.categories.update(&category).await?;
        tracing::info!(category_id = id, "Category updated");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Category updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update", result).await
}

/// DELETE /api/categories/own/:id
pub async fn delete(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Value> {
    let metrics = state.metrics.clone();
    let result = async move {
        owned_category(&state, &user, id).await?;
        state.repos.categories.delete(id).await?;

        tracing::info!(category_id = id, "Category deleted");
        Ok::<_, ApiError>(ApiResponse::success(Value::Null).with_message("Category deleted successfully"))
    }
    .await;

    track(&metrics, ENTITY, "delete", result).await
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::{api_app, send, token_for, MemoryStore};

    async fn portfolio(app: &axum::Router, token: &str) -> i64 {
        let (_, body) = send(app, Method::POST, "/api/portfolios/own", Some(token), Some(json!({ "title": "P" }))).await;
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn position_defaults_to_next_slot() {
        let app = api_app(&MemoryStore::new());
        let token = token_for(1);
        let portfolio_id = portfolio(&app, &token).await;

        let (status, first) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token),
            Some(json!({ "title": "Web", "portfolio_id": portfolio_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["data"]["position"], 1);

        let (_, second) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token),
            Some(json!({ "title": "Print", "portfolio_id": portfolio_id })),
        )
        .await;
        assert_eq!(second["data"]["position"], 2);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token),
            Some(json!({ "title": "Web", "portfolio_id": portfolio_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Category with this title already exists in the portfolio");
    }

    #[tokio::test]
    async fn parent_portfolio_must_exist_and_be_owned() {
        let app = api_app(&MemoryStore::new());
        let portfolio_id = portfolio(&app, &token_for(1)).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token_for(1)),
            Some(json!({ "title": "Web", "portfolio_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Portfolio not found");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token_for(2)),
            Some(json!({ "title": "Web", "portfolio_id": portfolio_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let app = api_app(&MemoryStore::new());
        let token = token_for(1);
        let portfolio_id = portfolio(&app, &token).await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/categories/own",
            Some(&token),
            Some(json!({ "title": "Web", "description": "Sites", "portfolio_id": portfolio_id, "position": 4 })),
        )
        .await;
        let uri = format!("/api/categories/own/{}", created["data"]["id"]);

        let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "position": 9 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Web");
        assert_eq!(body["data"]["description"], "Sites");
        assert_eq!(body["data"]["position"], 9);
    }
}
