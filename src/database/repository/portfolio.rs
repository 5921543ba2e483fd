use async_trait::async_trait;
use sqlx::PgPool;

use super::{PortfolioRepository, RepoResult};
use crate::database::models::{
    CategoryWithProjects, NewPortfolio, Portfolio, PortfolioWithRelations, Project,
};
use crate::database::repository::category::CATEGORY_COLUMNS;
use crate::database::repository::project::PROJECT_COLUMNS;
use crate::database::repository::section::load_sections_with_contents;
use crate::database::models::Category;
use crate::types::{Page, Pagination};

const PORTFOLIO_COLUMNS: &str = "id, title, description, owner_id, created_at, updated_at";

pub struct PgPortfolioRepository {
    pool: PgPool,
}

impl PgPortfolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page(&self, owner_id: Option<&str>, page: Pagination) -> RepoResult<Page<Portfolio>> {
        let items: Vec<Portfolio> = sqlx::query_as(&format!(
            r#"
            SELECT {PORTFOLIO_COLUMNS}
            FROM portfolios
            WHERE ($1::TEXT IS NULL OR owner_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM portfolios WHERE ($1::TEXT IS NULL OR owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl PortfolioRepository for PgPortfolioRepository {
    async fn create(&self, portfolio: NewPortfolio) -> RepoResult<Portfolio> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO portfolios (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {PORTFOLIO_COLUMNS}
            "#
        ))
        .bind(&portfolio.title)
        .bind(&portfolio.description)
        .bind(&portfolio.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id_basic(&self, id: i64) -> RepoResult<Option<Portfolio>> {
        let portfolio = sqlx::query_as(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(portfolio)
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<PortfolioWithRelations>> {
        let Some(portfolio) = self.get_by_id_basic(id).await? else {
            return Ok(None);
        };

        let categories: Vec<Category> = sqlx::query_as(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE portfolio_id = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let category_ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        let projects: Vec<Project> = sqlx::query_as(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE category_id = ANY($1)
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(&category_ids)
        .fetch_all(&self.pool)
        .await?;

        let categories = categories
            .into_iter()
            .map(|category| {
                let projects = projects
                    .iter()
                    .filter(|p| p.category_id == category.id)
                    .cloned()
                    .collect();
                CategoryWithProjects { category, projects }
            })
            .collect();

        let sections = load_sections_with_contents(&self.pool, id).await?;

        Ok(Some(PortfolioWithRelations {
            portfolio,
            categories,
            sections,
        }))
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Portfolio>> {
        self.page(Some(owner_id), page).await
    }

    async fn update(&self, portfolio: &Portfolio) -> RepoResult<Portfolio> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE portfolios
            SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {PORTFOLIO_COLUMNS}
            "#
        ))
        .bind(portfolio.id)
        .bind(&portfolio.title)
        .bind(&portfolio.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Portfolio>> {
        self.page(None, page).await
    }

    async fn check_duplicate(&self, title: &str, owner_id: &str, exclude_id: i64) -> RepoResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM portfolios
                WHERE title = $1 AND owner_id = $2 AND ($3 = 0 OR id <> $3)
            )
            "#,
        )
        .bind(title)
        .bind(owner_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
