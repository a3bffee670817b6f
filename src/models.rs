use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SignupForm {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "555-0002", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "2024-01-15", format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// lower-cased email
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
