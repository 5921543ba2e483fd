use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::utils::{ensure_owner, optional_text, pagination, track};
use crate::database::models::{NewPortfolio, Portfolio};
use crate::error::ApiError;
use crate::handlers::validation::Validator;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult, AuthUser, IdPath, PagedResponse, PagedResult};
use crate::state::ApiState;
use crate::types::PageQuery;

const ENTITY: &str = "portfolio";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioRequest {
    pub title: String,
    pub description: Option<String>,
}

impl PortfolioRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required("title", &self.title)
            .max_length("title", self.title.trim(), 255)
            .finish()
    }
}

async fn owned_portfolio(state: &ApiState, user: &AuthUser, id: i64) -> Result<Portfolio, ApiError> {
    let portfolio = state
        .repos
        .portfolios
        .get_by_id_basic(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
    ensure_owner(user, &portfolio.owner_id, ENTITY)?;
    Ok(portfolio)
}

/// GET /api/portfolios/own
pub async fn list_own(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> PagedResult<Portfolio> {
    let page = state
        .repos
        .portfolios
        .get_by_owner(&user.owner_id(), pagination(&state, &query))
        .await?;
    Ok(PagedResponse::new(page))
}

/// POST /api/portfolios/own
pub async fn create(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<PortfolioRequest>,
) -> ApiResult<Portfolio> {
    let metrics = state.metrics.clone();
    let result = async move {
        req.validate()?;
        let owner_id = user.owner_id();
        let title = req.title.trim().to_string();

        if state.repos.portfolios.check_duplicate(&title, &owner_id, 0).await? {
            return Err(ApiError::conflict("Portfolio with this title already exists"));
        }

        let portfolio = state
            .repos
            .portfolios
            .create(NewPortfolio {
                title,
                description: optional_text(req.description),
                owner_id,
            })
            .await?;

        tracing::info!(portfolio_id = portfolio.id, user_id = user.user_id, "Portfolio created");
        Ok::<_, ApiError>(ApiResponse::created(portfolio).with_message("Portfolio created successfully"))
    }
    .await;

    track(&metrics, ENTITY, "create", result).await
}

/// PUT /api/portfolios/own/:id
pub async fn update(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(req): ApiJson<PortfolioRequest>,
) -> ApiResult<Portfolio> {
    let metrics = state.metrics.clone();
    let result = async move {
        req.validate()?;
        let mut portfolio = owned_portfolio(&state, &user, id).await?;
        let title = req.title.trim().to_string();

        if state
            .repos
            .portfolios
            .check_duplicate(&title, &portfolio.owner_id, id)
            .await?
        {
            return Err(ApiError::conflict("Portfolio with this title already exists"));
        }

        portfolio.title = title;
        portfolio.description = optional_text(req.description);
        let updated = state.repos.portfolios.update(&portfolio).await?;

        tracing::info!(portfolio_id = id, "Portfolio updated");
        Ok::<_, ApiError>(ApiResponse::success(updated).with_message("Portfolio updated successfully"))
    }
    .await;

    track(&metrics, ENTITY, "update", result).await
}

/// DELETE /api/portfolios/own/:id
pub async fn delete(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Value> {
    let metrics = state.metrics.clone();
    let result = async move {
        owned_portfolio(&state, &user, id).await?;
        state.repos.portfolios.delete(id).await?;

        tracing::info!(portfolio_id = id, "Portfolio deleted");
        Ok::<_, ApiError>(ApiResponse::success(Value::Null).with_message("Portfolio deleted successfully"))
    }
    .await;

    track(&metrics, ENTITY, "delete", result).await
}
