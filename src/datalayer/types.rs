use chrono::{DateTime, Utc};
use sea_query::Iden;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User struct matching the users table schema
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identifiers for the users table and its columns
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    Age,
    CreatedAt,
    UpdatedAt,
}
