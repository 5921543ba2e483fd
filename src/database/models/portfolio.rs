use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::CategoryWithProjects;
use super::section::SectionWithContents;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPortfolio {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
}

/// Portfolio with its categories (and their projects) and sections (and their contents)
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioWithRelations {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub categories: Vec<CategoryWithProjects>,
    pub sections: Vec<SectionWithContents>,
}
