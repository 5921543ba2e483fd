use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::project::Project;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub portfolio_id: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub portfolio_id: i64,
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithProjects {
    #[serde(flatten)]
    pub category: Category,
    pub projects: Vec<Project>,
}
