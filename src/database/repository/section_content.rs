use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepoResult, SectionContentRepository};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewSectionContent, SectionContent};

pub(crate) const CONTENT_COLUMNS: &str = "id, section_id, content_type, content, sort_order, \
     metadata, owner_id, created_at, updated_at";

pub struct PgSectionContentRepository {
    pool: PgPool,
}

impl PgSectionContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionContentRepository for PgSectionContentRepository {
    async fn create(&self, content: NewSectionContent) -> RepoResult<SectionContent> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO section_contents (section_id, content_type, content, sort_order, metadata, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(content.section_id)
        .bind(content.content_type.as_str())
        .bind(&content.content)
        .bind(content.order)
        .bind(&content.metadata)
        .bind(&content.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<SectionContent>> {
        let content = sqlx::query_as(&format!(
            "SELECT {CONTENT_COLUMNS} FROM section_contents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(content)
    }

    async fn get_by_section_id(&self, section_id: i64) -> RepoResult<Vec<SectionContent>> {
        let contents = sqlx::query_as(&format!(
            r#"
            SELECT {CONTENT_COLUMNS} FROM section_contents
            WHERE section_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#
        ))
        .bind(section_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contents)
    }

    async fn update(&self, content: &SectionContent) -> RepoResult<SectionContent> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE section_contents
            SET content_type = $2, content = $3, sort_order = $4, metadata = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(content.id)
        .bind(&content.content_type)
        .bind(&content.content)
        .bind(content.order)
        .bind(&content.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_order(&self, id: i64, order: i32) -> RepoResult<SectionContent> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE section_contents
            SET sort_order = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(order)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DatabaseError::NotFound("Content not found".to_string()))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM section_contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn next_order(&self, section_id: i64) -> RepoResult<i32> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM section_contents WHERE section_id = $1",
        )
        .bind(section_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    async fn check_duplicate_order(&self, section_id: i64, order: i32, exclude_id: i64) -> RepoResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM section_contents
                WHERE section_id = $1 AND sort_order = $2 AND ($3 = 0 OR id <> $3)
            )
            "#,
        )
        .bind(section_id)
        .bind(order)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
