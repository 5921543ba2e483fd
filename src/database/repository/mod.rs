//! Repository interfaces, one per resource.
//!
//! Handlers depend only on these traits; `Pg*Repository` types implement them
//! over a shared `PgPool`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::database::manager::{DatabaseError, DatabaseManager, PoolStats};
use crate::database::models::*;
use crate::types::{Page, Pagination};

pub mod category;
pub mod portfolio;
pub mod project;
pub mod section;
pub mod section_content;
pub mod user;

pub use category::PgCategoryRepository;
pub use portfolio::PgPortfolioRepository;
pub use project::PgProjectRepository;
pub use section::PgSectionRepository;
pub use section_content::PgSectionContentRepository;
pub use user::PgUserRepository;

pub type RepoResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn create(&self, portfolio: NewPortfolio) -> RepoResult<Portfolio>;
    async fn get_by_id_basic(&self, id: i64) -> RepoResult<Option<Portfolio>>;
    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<PortfolioWithRelations>>;
    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Portfolio>>;
    async fn update(&self, portfolio: &Portfolio) -> RepoResult<Portfolio>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn list(&self, page: Pagination) -> RepoResult<Page<Portfolio>>;
    /// `exclude_id = 0` excludes nothing.
    async fn check_duplicate(&self, title: &str, owner_id: &str, exclude_id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> RepoResult<Category>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<CategoryWithProjects>>;
    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Category>>;
    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Category>>;
    async fn update(&self, category: &Category) -> RepoResult<Category>;
    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn list(&self, page: Pagination) -> RepoResult<Page<Category>>;
    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32>;
    async fn check_duplicate(&self, title: &str, portfolio_id: i64, exclude_id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> RepoResult<Project>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Project>>;
    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Project>>;
    async fn get_by_category_id(&self, category_id: i64) -> RepoResult<Vec<Project>>;
    async fn update(&self, project: &Project) -> RepoResult<Project>;
    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn list(&self, page: Pagination) -> RepoResult<Page<Project>>;
    /// Projects sharing at least one of `skills`.
    async fn get_by_skills(&self, skills: &[String]) -> RepoResult<Vec<Project>>;
    async fn get_by_client(&self, client: &str) -> RepoResult<Vec<Project>>;
    async fn next_position(&self, category_id: i64) -> RepoResult<i32>;
    async fn check_duplicate(&self, title: &str, category_id: i64, exclude_id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn create(&self, section: NewSection) -> RepoResult<Section>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Section>>;
    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<SectionWithContents>>;
    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Section>>;
    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Section>>;
    async fn get_by_portfolio_id_with_relations(&self, portfolio_id: i64) -> RepoResult<Vec<SectionWithContents>>;
    async fn get_by_type(&self, section_type: &str) -> RepoResult<Vec<Section>>;
    async fn update(&self, section: &Section) -> RepoResult<Section>;
    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn list(&self, page: Pagination) -> RepoResult<Page<Section>>;
    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32>;
    async fn check_duplicate(&self, title: &str, portfolio_id: i64, exclude_id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait SectionContentRepository: Send + Sync {
    async fn create(&self, content: NewSectionContent) -> RepoResult<SectionContent>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<SectionContent>>;
    async fn get_by_section_id(&self, section_id: i64) -> RepoResult<Vec<SectionContent>>;
    async fn update(&self, content: &SectionContent) -> RepoResult<SectionContent>;
    async fn update_order(&self, id: i64, order: i32) -> RepoResult<SectionContent>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    /// Highest order in the section plus one, or 0 for an empty section.
    async fn next_order(&self, section_id: i64) -> RepoResult<i32>;
    async fn check_duplicate_order(&self, section_id: i64, order: i32, exclude_id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn get_by_id(&self, id: i64) -> RepoResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// True when another user (not `exclude_id`) already has this email or username.
    async fn exists_by_email_or_username(&self, email: &str, username: &str, exclude_id: i64) -> RepoResult<bool>;
    async fn update_profile(&self, id: i64, username: &str, email: &str) -> RepoResult<User>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
    /// Newest first.
    async fn list(&self, page: Pagination) -> RepoResult<Page<User>>;
    async fn count(&self) -> RepoResult<i64>;
}

/// Connectivity probe used by `/health`, `/ready` and the metrics collector
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> RepoResult<()>;
    fn pool_stats(&self) -> PoolStats;
}

#[async_trait]
impl StoreHealth for PgPool {
    async fn ping(&self) -> RepoResult<()> {
        DatabaseManager::health_check(self).await
    }

    fn pool_stats(&self) -> PoolStats {
        DatabaseManager::pool_stats(self)
    }
}

/// Repositories used by the portfolio API
#[derive(Clone)]
pub struct PortfolioRepositories {
    pub portfolios: Arc<dyn PortfolioRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub sections: Arc<dyn SectionRepository>,
    pub contents: Arc<dyn SectionContentRepository>,
    pub store: Arc<dyn StoreHealth>,
}

impl PortfolioRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            portfolios: Arc::new(PgPortfolioRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            projects: Arc::new(PgProjectRepository::new(pool.clone())),
            sections: Arc::new(PgSectionRepository::new(pool.clone())),
            contents: Arc::new(PgSectionContentRepository::new(pool.clone())),
            store: Arc::new(pool),
        }
    }
}

/// Repositories used by the auth service
#[derive(Clone)]
pub struct AuthRepositories {
    pub users: Arc<dyn UserRepository>,
    pub store: Arc<dyn StoreHealth>,
}

impl AuthRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            store: Arc::new(pool),
        }
    }
}
