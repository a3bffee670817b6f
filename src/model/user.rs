use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    /// Always stored lower-cased.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// What a user may see about themselves; never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "name": "John Doe",
    "email": "john@example.com",
    "role": "employee",
    "phone": "555-0002",
    "hire_date": "2024-01-15"
}))]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            hire_date: user.hire_date,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
