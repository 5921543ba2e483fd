use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepoResult, SectionRepository};
use crate::database::models::{NewSection, Section, SectionContent, SectionWithContents};
use crate::database::repository::section_content::CONTENT_COLUMNS;
use crate::types::{Page, Pagination};

const SECTION_COLUMNS: &str =
    "id, title, description, section_type, position, portfolio_id, owner_id, created_at, updated_at";

async fn load_sections(pool: &PgPool, portfolio_id: i64) -> RepoResult<Vec<Section>> {
    let sections = sqlx::query_as(&format!(
        r#"
        SELECT {SECTION_COLUMNS} FROM sections
        WHERE portfolio_id = $1
        ORDER BY position ASC, created_at ASC
        "#
    ))
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;

    Ok(sections)
}

async fn attach_contents(pool: &PgPool, sections: Vec<Section>) -> RepoResult<Vec<SectionWithContents>> {
    let ids: Vec<i64> = sections.iter().map(|s| s.id).collect();
    let contents: Vec<SectionContent> = sqlx::query_as(&format!(
        r#"
        SELECT {CONTENT_COLUMNS} FROM section_contents
        WHERE section_id = ANY($1)
        ORDER BY sort_order ASC, created_at ASC
        "#
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    Ok(sections
        .into_iter()
        .map(|section| {
            let contents = contents
                .iter()
                .filter(|c| c.section_id == section.id)
                .cloned()
                .collect();
            SectionWithContents { section, contents }
        })
        .collect())
}

/// Sections of a portfolio, each with its ordered contents (two queries, no N+1).
pub(crate) async fn load_sections_with_contents(
    pool: &PgPool,
    portfolio_id: i64,
) -> RepoResult<Vec<SectionWithContents>> {
    let sections = load_sections(pool, portfolio_id).await?;
    attach_contents(pool, sections).await
}

pub struct PgSectionRepository {
    pool: PgPool,
}

impl PgSectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page(&self, owner_id: Option<&str>, page: Pagination) -> RepoResult<Page<Section>> {
        let items: Vec<Section> = sqlx::query_as(&format!(
            r#"
            SELECT {SECTION_COLUMNS}
            FROM sections
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
            "SELECT COUNT(*) FROM sections WHERE ($1::TEXT IS NULL OR owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl SectionRepository for PgSectionRepository {
    async fn create(&self, section: NewSection) -> RepoResult<Section> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO sections (title, description, section_type, position, portfolio_id, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SECTION_COLUMNS}
            "#
        ))
        .bind(&section.title)
        .bind(&section.description)
        .bind(&section.section_type)
        .bind(section.position)
        .bind(section.portfolio_id)
        .bind(&section.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Section>> {
        let section = sqlx::query_as(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<SectionWithContents>> {
        let Some(section) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        Ok(attach_contents(&self.pool, vec![section]).await?.pop())
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Section>> {
        self.page(Some(owner_id), page).await
    }

    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Section>> {
        load_sections(&self.pool, portfolio_id).await
    }

    async fn get_by_portfolio_id_with_relations(&self, portfolio_id: i64) -> RepoResult<Vec<SectionWithContents>> {
        load_sections_with_contents(&self.pool, portfolio_id).await
    }

    async fn get_by_type(&self, section_type: &str) -> RepoResult<Vec<Section>> {
        let sections = sqlx::query_as(&format!(
            r#"
            SELECT {SECTION_COLUMNS} FROM sections
            WHERE section_type = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(section_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    async fn update(&self, section: &Section) -> RepoResult<Section> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE sections
            SET title = $2, description = $3, section_type = $4, position = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {SECTION_COLUMNS}
            "#
        ))
        .bind(section.id)
        .bind(&section.title)
        .bind(&section.description)
        .bind(&section.section_type)
        .bind(section.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        sqlx::query("UPDATE sections SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Section>> {
        self.page(None, page).await
    }

    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM sections WHERE portfolio_id = $1",
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
                SELECT 1 FROM sections
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
