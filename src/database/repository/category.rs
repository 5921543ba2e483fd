use async_trait::async_trait;
use sqlx::PgPool;

use super::{CategoryRepository, RepoResult};
use crate::database::models::{Category, CategoryWithProjects, NewCategory};
use crate::database::repository::project::load_projects_for_category;
use crate::types::{Page, Pagination};

pub(crate) const CATEGORY_COLUMNS: &str =
    "id, title, description, position, portfolio_id, owner_id, created_at, updated_at";

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page(&self, owner_id: Option<&str>, page: Pagination) -> RepoResult<Page<Category>> {
        let items: Vec<Category> = sqlx::query_as(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE ($1::TEXT IS NULL OR owner_id = $1)
            ORDER BY position ASC, created_at ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM categories WHERE ($1::TEXT IS NULL OR owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO categories (title, description, position, portfolio_id, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&category.title)
        .bind(&category.description)
        .bind(category.position)
        .bind(category.portfolio_id)
        .bind(&category.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<CategoryWithProjects>> {
        let Some(category) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let projects = load_projects_for_category(&self.pool, id).await?;
        Ok(Some(CategoryWithProjects { category, projects }))
    }

    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE portfolio_id = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(portfolio_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Category>> {
        self.page(Some(owner_id), page).await
    }

    async fn update(&self, category: &Category) -> RepoResult<Category> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE categories
            SET title = $2, description = $3, position = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(category.id)
        .bind(&category.title)
        .bind(&category.description)
        .bind(category.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        sqlx::query("UPDATE categories SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Category>> {
        self.page(None, page).await
    }

    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM categories WHERE portfolio_id = $1",
        )
        .bind(portfolio_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    async fn check_duplicate(&self, title: &str, portfolio_id: i64, exclude_id: i64) -> RepoResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE title = $1 AND portfolio_id = $2 AND ($3 = 0 OR id <> $3)
            )
            "#,
        )
        .bind(title)
        .bind(portfolio_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
