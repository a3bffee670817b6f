use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::utils::time::{clock, display_time};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ShiftType {
    Morning,
    Afternoon,
    Evening,
    Weekend,
}

impl ShiftType {
    /// Fixed working hours used when an admin posts a shift without explicit times.
    pub fn default_hours(self) -> (NaiveTime, NaiveTime) {
        match self {
            ShiftType::Morning => (clock(8, 0), clock(16, 0)),
            ShiftType::Afternoon => (clock(12, 0), clock(20, 0)),
            ShiftType::Evening => (clock(16, 0), clock(0, 0)),
            ShiftType::Weekend => (clock(9, 0), clock(17, 0)),
        }
    }
}

/// Status of a shift an employee asked for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

/// Status of a shift an admin posted for anyone to claim.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostingStatus {
    Open,
    Taken,
}

/// Flat status as persisted and filtered on.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftStatus {
    Pending,
    Approved,
    Denied,
    Open,
    Taken,
}

impl From<RequestStatus> for ShiftStatus {
    fn from(s: RequestStatus) -> Self {
        match s {
            RequestStatus::Pending => ShiftStatus::Pending,
            RequestStatus::Approved => ShiftStatus::Approved,
            RequestStatus::Denied => ShiftStatus::Denied,
        }
    }
}

impl From<PostingStatus> for ShiftStatus {
    fn from(s: PostingStatus) -> Self {
        match s {
            PostingStatus::Open => ShiftStatus::Open,
            PostingStatus::Taken => ShiftStatus::Taken,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShiftOrigin {
    EmployeeRequest,
    AdminPosted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShiftKind {
    AdminPosted {
        start_time: NaiveTime,
        end_time: NaiveTime,
        status: PostingStatus,
        /// `None` while the shift is still open.
        assigned_to: Option<u64>,
    },
    EmployeeRequested {
        requested_by: u64,
        status: RequestStatus,
    },
}

#[derive(Debug, Clone)]
pub struct Shift {
    pub id: u64,
    pub shift_type: ShiftType,
    /// Normalized to midday UTC of the calendar day.
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub posted_by: u64,
    pub kind: ShiftKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn origin(&self) -> ShiftOrigin {
        match self.kind {
            ShiftKind::AdminPosted { .. } => ShiftOrigin::AdminPosted,
            ShiftKind::EmployeeRequested { .. } => ShiftOrigin::EmployeeRequest,
        }
    }

    pub fn status(&self) -> ShiftStatus {
        match self.kind {
            ShiftKind::AdminPosted { status, .. } => status.into(),
            ShiftKind::EmployeeRequested { status, .. } => status.into(),
        }
    }

    /// The employee this shift belongs to: the requester, or whoever claimed the posting.
    pub fn owner(&self) -> Option<u64> {
        match self.kind {
            ShiftKind::AdminPosted { assigned_to, .. } => assigned_to,
            ShiftKind::EmployeeRequested { requested_by, .. } => Some(requested_by),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub shift_type: ShiftType,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub posted_by: u64,
    pub kind: ShiftKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 4,
    "shift_type": "Weekend",
    "date": "2025-12-21T12:00:00Z",
    "start_time": "9:00 AM",
    "end_time": "5:00 PM",
    "status": "open",
    "is_employee_request": false,
    "assigned_to": null,
    "requested_by": null,
    "posted_by": 1,
    "location": "Warehouse",
    "notes": null
}))]
pub struct ShiftView {
    pub id: u64,
    pub shift_type: ShiftType,
    #[schema(value_type = String, format = "date-time")]
    pub date: DateTime<Utc>,
    #[schema(nullable = true)]
    pub start_time: Option<String>,
    #[schema(nullable = true)]
    pub end_time: Option<String>,
    pub status: ShiftStatus,
    pub is_employee_request: bool,
    #[schema(nullable = true)]
    pub assigned_to: Option<u64>,
    #[schema(nullable = true)]
    pub requested_by: Option<u64>,
    pub posted_by: u64,
    #[schema(nullable = true)]
    pub location: Option<String>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

impl From<&Shift> for ShiftView {
    fn from(shift: &Shift) -> Self {
        let (start_time, end_time, assigned_to, requested_by) = match &shift.kind {
            ShiftKind::AdminPosted {
                start_time,
                end_time,
                assigned_to,
                ..
            } => (
                Some(display_time(*start_time)),
                Some(display_time(*end_time)),
                *assigned_to,
                None,
            ),
            ShiftKind::EmployeeRequested { requested_by, .. } => {
                (None, None, Some(*requested_by), Some(*requested_by))
            }
        };

        Self {
            id: shift.id,
            shift_type: shift.shift_type,
            date: shift.date,
            start_time,
            end_time,
            status: shift.status(),
            is_employee_request: shift.origin() == ShiftOrigin::EmployeeRequest,
            assigned_to,
            requested_by,
            posted_by: shift.posted_by,
            location: shift.location.clone(),
            notes: shift.notes.clone(),
        }
    }
}
