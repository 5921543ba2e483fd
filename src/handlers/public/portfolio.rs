use axum::extract::State;

use crate::database::models::{Category, Portfolio, PortfolioWithRelations, SectionWithContents};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, IdPath};
use crate::state::ApiState;

async fn require_portfolio(state: &ApiState, id: i64) -> Result<Portfolio, ApiError> {
    state
        .repos
        .portfolios
        .get_by_id_basic(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))
}

/// GET /api/portfolios/id/:id
pub async fn get_basic(State(state): State<ApiState>, IdPath(id): IdPath) -> ApiResult<Portfolio> {
    Ok(ApiResponse::success(require_portfolio(&state, id).await?))
}

/// GET /api/portfolios/public/:id - portfolio with categories, projects,
/// sections and section contents
pub async fn get_public(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> ApiResult<PortfolioWithRelations> {
    let portfolio = state
        .repos
        .portfolios
        .get_by_id_with_relations(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
    Ok(ApiResponse::success(portfolio))
}

/// GET /api/portfolios/public/:id/categories
pub async fn get_categories(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> ApiResult<Vec<Category>> {
    require_portfolio(&state, id).await?;
    let categories = state.repos.categories.get_by_portfolio_id(id).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/portfolios/public/:id/sections
pub async fn get_sections(
    State(state): State<ApiState>,
    IdPath(id): IdPath,
) -> ApiResult<Vec<SectionWithContents>> {
    require_portfolio(&state, id).await?;
    let sections = state
        .repos
        .sections
        .get_by_portfolio_id_with_relations(id)
        .await?;
    Ok(ApiResponse::success(sections))
}
