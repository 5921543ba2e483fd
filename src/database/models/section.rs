use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::section_content::SectionContent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub section_type: String,
    pub position: i32,
    pub portfolio_id: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub title: String,
    pub description: Option<String>,
    pub section_type: String,
    pub position: i32,
    pub portfolio_id: i64,
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionWithContents {
    #[serde(flatten)]
    pub section: Section,
    pub contents: Vec<SectionContent>,
}
