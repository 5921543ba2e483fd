use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub main_image: Option<String>,
    pub skills: Vec<String>,
    pub client: Option<String>,
    pub link: Option<String>,
    pub position: i32,
    pub category_id: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub main_image: Option<String>,
    pub skills: Vec<String>,
    pub client: Option<String>,
    pub link: Option<String>,
    pub position: i32,
    pub category_id: i64,
    pub owner_id: String,
}
