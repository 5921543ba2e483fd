use async_trait::async_trait;
use sqlx::PgPool;

use super::{ProjectRepository, RepoResult};
use crate::database::models::{NewProject, Project};
use crate::types::{Page, Pagination};

pub(crate) const PROJECT_COLUMNS: &str = "id, title, description, images, main_image, skills, \
     client, link, position, category_id, owner_id, created_at, updated_at";

pub(crate) async fn load_projects_for_category(
    pool: &PgPool,
    category_id: i64,
) -> RepoResult<Vec<Project>> {
    let projects = sqlx::query_as(&format!(
        r#"
        SELECT {PROJECT_COLUMNS} FROM projects
        WHERE category_id = $1
        ORDER BY position ASC, created_at ASC
        "#
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page(&self, owner_id: Option<&str>, page: Pagination) -> RepoResult<Page<Project>> {
        let items: Vec<Project> = sqlx::query_as(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
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
            "SELECT COUNT(*) FROM projects WHERE ($1::TEXT IS NULL OR owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO projects
                (title, description, images, main_image, skills, client, link, position, category_id, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.images)
        .bind(&project.main_image)
        .bind(&project.skills)
        .bind(&project.client)
        .bind(&project.link)
        .bind(project.position)
        .bind(project.category_id)
        .bind(&project.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Project>> {
        let project = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Project>> {
        self.page(Some(owner_id), page).await
    }

    async fn get_by_category_id(&self, category_id: i64) -> RepoResult<Vec<Project>> {
        load_projects_for_category(&self.pool, category_id).await
    }

    async fn update(&self, project: &Project) -> RepoResult<Project> {
        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE projects
            SET title = $2, description = $3, images = $4, main_image = $5, skills = $6,
                client = $7, link = $8, position = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.images)
        .bind(&project.main_image)
        .bind(&project.skills)
        .bind(&project.client)
        .bind(&project.link)
        .bind(project.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        sqlx::query("UPDATE projects SET position = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Project>> {
        self.page(None, page).await
    }

    async fn get_by_skills(&self, skills: &[String]) -> RepoResult<Vec<Project>> {
        let projects = sqlx::query_as(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE skills && $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(skills)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn get_by_client(&self, client: &str) -> RepoResult<Vec<Project>> {
        let projects = sqlx::query_as(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE client = $1
            ORDER BY position ASC, created_at ASC
            "#
        ))
        .bind(client)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn next_position(&self, category_id: i64) -> RepoResult<i32> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM projects WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    async fn check_duplicate(&self, title: &str, category_id: i64, exclude_id: i64) -> RepoResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM projects
                WHERE title = $1 AND category_id = $2 AND ($3 = 0 OR id <> $3)
            )
            "#,
        )
        .bind(title)
        .bind(category_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
