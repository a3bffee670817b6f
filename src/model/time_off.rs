use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeOffStatus {
    Pending,
    Approved,
    /// Terminal; denied requests are kept for the review history.
    Denied,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 2,
    "start_date": "2025-12-25T12:00:00Z",
    "end_date": "2025-12-28T12:00:00Z",
    "reason": "Vacation",
    "notes": "Holiday vacation",
    "status": "pending",
    "reviewed_by": null,
    "reviewed_at": null,
    "admin_notes": null,
    "created_at": "2025-12-01T09:30:00Z"
}))]
pub struct TimeOffRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date-time")]
    pub start_date: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub end_date: DateTime<Utc>,
    pub reason: String,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    pub status: TimeOffStatus,
    #[schema(nullable = true)]
    pub reviewed_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub admin_notes: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTimeOff {
    pub employee_id: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A reviewer's decision on a pending request.
#[derive(Debug, Clone)]
pub struct TimeOffReview {
    pub status: TimeOffStatus,
    pub reviewed_by: u64,
    pub reviewed_at: DateTime<Utc>,
    pub admin_notes: Option<String>,
}
