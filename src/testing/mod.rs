//! In-memory repositories and request helpers for router tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::JwtKeys;
use crate::config::{AppConfig, Service};
use crate::database::models::*;
use crate::database::repository::*;
use crate::database::{DatabaseError, PoolStats};
use crate::metrics::Metrics;
use crate::state::{ApiState, AuthState};
use crate::types::{Page, Pagination};

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
struct Tables {
    portfolios: Vec<Portfolio>,
    categories: Vec<Category>,
    projects: Vec<Project>,
    sections: Vec<Section>,
    contents: Vec<SectionContent>,
    users: Vec<User>,
}

/// Every repository trait over one set of vectors. Deletes cascade the way the
/// foreign keys do.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    next_id: AtomicI64,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `ping`, `count` and `get_by_email` fail, as if the database were
    /// unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_up(&self) -> RepoResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn paginate<T>(rows: Vec<T>, page: Pagination) -> Page<T> {
    let total = rows.len() as i64;
    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(data, page, total)
}

fn missing() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::RowNotFound)
}

fn remove_section_tree(tables: &mut Tables, section_ids: &[i64]) {
    tables.contents.retain(|c| !section_ids.contains(&c.section_id));
    tables.sections.retain(|s| !section_ids.contains(&s.id));
}

fn remove_category_tree(tables: &mut Tables, category_ids: &[i64]) {
    tables.projects.retain(|p| !category_ids.contains(&p.category_id));
    tables.categories.retain(|c| !category_ids.contains(&c.id));
}

fn projects_of(tables: &Tables, category_id: i64) -> Vec<Project> {
    let mut projects: Vec<Project> = tables
        .projects
        .iter()
        .filter(|p| p.category_id == category_id)
        .cloned()
        .collect();
    projects.sort_by_key(|p| (p.position, p.id));
    projects
}

fn contents_of(tables: &Tables, section_id: i64) -> Vec<SectionContent> {
    let mut contents: Vec<SectionContent> = tables
        .contents
        .iter()
        .filter(|c| c.section_id == section_id)
        .cloned()
        .collect();
    contents.sort_by_key(|c| (c.order, c.id));
    contents
}

fn sections_of(tables: &Tables, portfolio_id: i64) -> Vec<Section> {
    let mut sections: Vec<Section> = tables
        .sections
        .iter()
        .filter(|s| s.portfolio_id == portfolio_id)
        .cloned()
        .collect();
    sections.sort_by_key(|s| (s.position, s.id));
    sections
}

fn categories_of(tables: &Tables, portfolio_id: i64) -> Vec<Category> {
    let mut categories: Vec<Category> = tables
        .categories
        .iter()
        .filter(|c| c.portfolio_id == portfolio_id)
        .cloned()
        .collect();
    categories.sort_by_key(|c| (c.position, c.id));
    categories
}

#[async_trait]
impl PortfolioRepository for MemoryStore {
    async fn create(&self, portfolio: NewPortfolio) -> RepoResult<Portfolio> {
        let now = Utc::now();
        let row = Portfolio {
            id: self.next_id(),
            title: portfolio.title,
            description: portfolio.description,
            owner_id: portfolio.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().portfolios.push(row.clone());
        Ok(row)
    }

    async fn get_by_id_basic(&self, id: i64) -> RepoResult<Option<Portfolio>> {
        Ok(self.tables().portfolios.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<PortfolioWithRelations>> {
        let tables = self.tables();
        let Some(portfolio) = tables.portfolios.iter().find(|p| p.id == id).cloned() else {
            return Ok(None);
        };
        let categories = categories_of(&tables, id)
            .into_iter()
            .map(|category| CategoryWithProjects {
                projects: projects_of(&tables, category.id),
                category,
            })
            .collect();
        let sections = sections_of(&tables, id)
            .into_iter()
            .map(|section| SectionWithContents {
                contents: contents_of(&tables, section.id),
                section,
            })
            .collect();
        Ok(Some(PortfolioWithRelations {
            portfolio,
            categories,
            sections,
        }))
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Portfolio>> {
        let mut rows: Vec<Portfolio> = self
            .tables()
            .portfolios
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| std::cmp::Reverse(p.id));
        Ok(paginate(rows, page))
    }

    async fn update(&self, portfolio: &Portfolio) -> RepoResult<Portfolio> {
        let mut tables = self.tables();
        let row = tables
            .portfolios
            .iter_mut()
            .find(|p| p.id == portfolio.id)
            .ok_or_else(missing)?;
        row.title = portfolio.title.clone();
        row.description = portfolio.description.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.tables();
        let sections: Vec<i64> = sections_of(&tables, id).iter().map(|s| s.id).collect();
        let categories: Vec<i64> = categories_of(&tables, id).iter().map(|c| c.id).collect();
        remove_section_tree(&mut tables, &sections);
        remove_category_tree(&mut tables, &categories);
        tables.portfolios.retain(|p| p.id != id);
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Portfolio>> {
        let mut rows = self.tables().portfolios.clone();
        rows.sort_by_key(|p| std::cmp::Reverse(p.id));
        Ok(paginate(rows, page))
    }

    async fn check_duplicate(&self, title: &str, owner_id: &str, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .portfolios
            .iter()
            .any(|p| p.title == title && p.owner_id == owner_id && p.id != exclude_id))
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let now = Utc::now();
        let row = Category {
            id: self.next_id(),
            title: category.title,
            description: category.description,
            position: category.position,
            portfolio_id: category.portfolio_id,
            owner_id: category.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().categories.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        Ok(self.tables().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<CategoryWithProjects>> {
        let tables = self.tables();
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .map(|category| CategoryWithProjects {
                projects: projects_of(&tables, id),
                category,
            }))
    }

    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Category>> {
        Ok(categories_of(&self.tables(), portfolio_id))
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Category>> {
        let mut rows: Vec<Category> = self
            .tables()
            .categories
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.position, c.id));
        Ok(paginate(rows, page))
    }

    async fn update(&self, category: &Category) -> RepoResult<Category> {
        let mut tables = self.tables();
        let row = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(missing)?;
        row.title = category.title.clone();
        row.description = category.description.clone();
        row.position = category.position;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        if let Some(row) = self.tables().categories.iter_mut().find(|c| c.id == id) {
            row.position = position;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        remove_category_tree(&mut self.tables(), &[id]);
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Category>> {
        let mut rows = self.tables().categories.clone();
        rows.sort_by_key(|c| (c.position, c.id));
        Ok(paginate(rows, page))
    }

    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32> {
        let max = categories_of(&self.tables(), portfolio_id)
            .iter()
            .map(|c| c.position)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn check_duplicate(&self, title: &str, portfolio_id: i64, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .categories
            .iter()
            .any(|c| c.title == title && c.portfolio_id == portfolio_id && c.id != exclude_id))
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create(&self, project: NewProject) -> RepoResult<Project> {
        let now = Utc::now();
        let row = Project {
            id: self.next_id(),
            title: project.title,
            description: project.description,
            images: project.images,
            main_image: project.main_image,
            skills: project.skills,
            client: project.client,
            link: project.link,
            position: project.position,
            category_id: project.category_id,
            owner_id: project.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().projects.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Project>> {
        Ok(self.tables().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Project>> {
        let mut rows: Vec<Project> = self
            .tables()
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.position, p.id));
        Ok(paginate(rows, page))
    }

    async fn get_by_category_id(&self, category_id: i64) -> RepoResult<Vec<Project>> {
        Ok(projects_of(&self.tables(), category_id))
    }

    async fn update(&self, project: &Project) -> RepoResult<Project> {
        let mut tables = self.tables();
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(missing)?;
        *row = Project {
            updated_at: Utc::now(),
            ..project.clone()
        };
        Ok(row.clone())
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        if let Some(row) = self.tables().projects.iter_mut().find(|p| p.id == id) {
            row.position = position;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.tables().projects.retain(|p| p.id != id);
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Project>> {
        let mut rows = self.tables().projects.clone();
        rows.sort_by_key(|p| (p.position, p.id));
        Ok(paginate(rows, page))
    }

    async fn get_by_skills(&self, skills: &[String]) -> RepoResult<Vec<Project>> {
        let mut rows: Vec<Project> = self
            .tables()
            .projects
            .iter()
            .filter(|p| p.skills.iter().any(|s| skills.contains(s)))
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.position, p.id));
        Ok(rows)
    }

    async fn get_by_client(&self, client: &str) -> RepoResult<Vec<Project>> {
        let needle = client.to_lowercase();
        let mut rows: Vec<Project> = self
            .tables()
            .projects
            .iter()
            .filter(|p| {
                p.client
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.position, p.id));
        Ok(rows)
    }

    async fn next_position(&self, category_id: i64) -> RepoResult<i32> {
        let max = projects_of(&self.tables(), category_id)
            .iter()
            .map(|p| p.position)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn check_duplicate(&self, title: &str, category_id: i64, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .projects
            .iter()
            .any(|p| p.title == title && p.category_id == category_id && p.id != exclude_id))
    }
}

#[async_trait]
impl SectionRepository for MemoryStore {
    async fn create(&self, section: NewSection) -> RepoResult<Section> {
        let now = Utc::now();
        let row = Section {
            id: self.next_id(),
            title: section.title,
            description: section.description,
            section_type: section.section_type,
            position: section.position,
            portfolio_id: section.portfolio_id,
            owner_id: section.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().sections.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<Section>> {
        Ok(self.tables().sections.iter().find(|s| s.id == id).cloned())
    }

    async fn get_by_id_with_relations(&self, id: i64) -> RepoResult<Option<SectionWithContents>> {
        let tables = self.tables();
        Ok(tables
            .sections
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .map(|section| SectionWithContents {
                contents: contents_of(&tables, id),
                section,
            }))
    }

    async fn get_by_owner(&self, owner_id: &str, page: Pagination) -> RepoResult<Page<Section>> {
        let mut rows: Vec<Section> = self
            .tables()
            .sections
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.position, s.id));
        Ok(paginate(rows, page))
    }

    async fn get_by_portfolio_id(&self, portfolio_id: i64) -> RepoResult<Vec<Section>> {
        Ok(sections_of(&self.tables(), portfolio_id))
    }

    async fn get_by_portfolio_id_with_relations(&self, portfolio_id: i64) -> RepoResult<Vec<SectionWithContents>> {
        let tables = self.tables();
        Ok(sections_of(&tables, portfolio_id)
            .into_iter()
            .map(|section| SectionWithContents {
                contents: contents_of(&tables, section.id),
                section,
            })
            .collect())
    }

    async fn get_by_type(&self, section_type: &str) -> RepoResult<Vec<Section>> {
        let mut rows: Vec<Section> = self
            .tables()
            .sections
            .iter()
            .filter(|s| s.section_type == section_type)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.position, s.id));
        Ok(rows)
    }

    async fn update(&self, section: &Section) -> RepoResult<Section> {
        let mut tables = self.tables();
        let row = tables
            .sections
            .iter_mut()
            .find(|s| s.id == section.id)
            .ok_or_else(missing)?;
        *row = Section {
            updated_at: Utc::now(),
            ..section.clone()
        };
        Ok(row.clone())
    }

    async fn update_position(&self, id: i64, position: i32) -> RepoResult<()> {
        if let Some(row) = self.tables().sections.iter_mut().find(|s| s.id == id) {
            row.position = position;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        remove_section_tree(&mut self.tables(), &[id]);
        Ok(())
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<Section>> {
        let mut rows = self.tables().sections.clone();
        rows.sort_by_key(|s| (s.position, s.id));
        Ok(paginate(rows, page))
    }

    async fn next_position(&self, portfolio_id: i64) -> RepoResult<i32> {
        let max = sections_of(&self.tables(), portfolio_id)
            .iter()
            .map(|s| s.position)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn check_duplicate(&self, title: &str, portfolio_id: i64, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .sections
            .iter()
            .any(|s| s.title == title && s.portfolio_id == portfolio_id && s.id != exclude_id))
    }
}

#[async_trait]
impl SectionContentRepository for MemoryStore {
    async fn create(&self, content: NewSectionContent) -> RepoResult<SectionContent> {
        let now = Utc::now();
        let row = SectionContent {
            id: self.next_id(),
            section_id: content.section_id,
            content_type: content.content_type.to_string(),
            content: content.content,
            order: content.order,
            metadata: content.metadata,
            owner_id: content.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.tables().contents.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<SectionContent>> {
        Ok(self.tables().contents.iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_section_id(&self, section_id: i64) -> RepoResult<Vec<SectionContent>> {
        Ok(contents_of(&self.tables(), section_id))
    }

    async fn update(&self, content: &SectionContent) -> RepoResult<SectionContent> {
        let mut tables = self.tables();
        let row = tables
            .contents
            .iter_mut()
            .find(|c| c.id == content.id)
            .ok_or_else(missing)?;
        *row = SectionContent {
            updated_at: Utc::now(),
            ..content.clone()
        };
        Ok(row.clone())
    }

    async fn update_order(&self, id: i64, order: i32) -> RepoResult<SectionContent> {
        let mut tables = self.tables();
        let row = tables
            .contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Content not found".to_string()))?;
        row.order = order;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.tables().contents.retain(|c| c.id != id);
        Ok(())
    }

    async fn next_order(&self, section_id: i64) -> RepoResult<i32> {
        Ok(contents_of(&self.tables(), section_id)
            .iter()
            .map(|c| c.order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn check_duplicate_order(&self, section_id: i64, order: i32, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .contents
            .iter()
            .any(|c| c.section_id == section_id && c.order == order && c.id != exclude_id))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(DatabaseError::UniqueViolation(
                "User with this email or username already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let row = User {
            id: self.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.check_up()?;
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str, exclude_id: i64) -> RepoResult<bool> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|u| u.id != exclude_id && (u.email == email || u.username == username)))
    }

    async fn update_profile(&self, id: i64, username: &str, email: &str) -> RepoResult<User> {
        let mut tables = self.tables();
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;
        row.username = username.to_string();
        row.email = email.to_string();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }

    async fn list(&self, page: Pagination) -> RepoResult<Page<User>> {
        let mut rows = self.tables().users.clone();
        rows.sort_by_key(|u| std::cmp::Reverse(u.id));
        Ok(paginate(rows, page))
    }

    async fn count(&self) -> RepoResult<i64> {
        self.check_up()?;
        Ok(self.tables().users.len() as i64)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> RepoResult<()> {
        self.check_up()
    }

    fn pool_stats(&self) -> PoolStats {
        PoolStats { size: 2, idle: 1 }
    }
}

pub fn test_config(service: Service) -> AppConfig {
    let mut config = AppConfig::from_env(service);
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.jwt_expiry_hours = 1;
    config.security.bcrypt_cost = 4;
    config.security.cors_permissive = true;
    config.pagination.default_limit = 10;
    config.pagination.max_limit = 100;
    config
}

pub fn api_state(store: &Arc<MemoryStore>) -> ApiState {
    let repos = PortfolioRepositories {
        portfolios: store.clone(),
        categories: store.clone(),
        projects: store.clone(),
        sections: store.clone(),
        contents: store.clone(),
        store: store.clone(),
    };
    ApiState::new(repos, &test_config(Service::Api), Arc::new(Metrics::new()))
}

pub fn auth_state(store: &Arc<MemoryStore>) -> AuthState {
    let repos = AuthRepositories {
        users: store.clone(),
        store: store.clone(),
    };
    AuthState::new(repos, &test_config(Service::Auth), Arc::new(Metrics::new()))
}

/// Portfolio API router over `store`, with permissive CORS
pub fn api_app(store: &Arc<MemoryStore>) -> Router {
    crate::server::api_router(api_state(store), &test_config(Service::Api).security)
}

pub fn auth_app(store: &Arc<MemoryStore>) -> Router {
    crate::server::auth_router(auth_state(store), &test_config(Service::Auth).security)
}

pub fn token_for(user_id: i64) -> String {
    JwtKeys::new(TEST_SECRET, Duration::hours(1))
        .issue(user_id)
        .unwrap()
}

/// Send one request through `app` and decode the body as JSON (text bodies
/// come back as a JSON string, empty bodies as null).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}
