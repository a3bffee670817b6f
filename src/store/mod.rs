//! Persistence seam for users, shifts, time-off requests and payroll.
//!
//! Every state transition is a single conditional write: the implementation
//! checks the expected current state (and owner, where one applies) and
//! mutates in the same atomic step, returning `false` when the predicate did
//! not hold. Callers never read-then-write.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use futures::stream::BoxStream;

use crate::model::{
    payroll::{NewPayroll, Payroll, PayrollFigures, PayrollStatus},
    role::Role,
    shift::{NewShift, RequestStatus, Shift, ShiftOrigin, ShiftStatus},
    time_off::{NewTimeOff, TimeOffRequest, TimeOffReview, TimeOffStatus},
    user::{NewUser, User},
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    /// A stored row does not describe a valid record.
    #[display(fmt = "corrupt record: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct ShiftQuery {
    pub origin: Option<ShiftOrigin>,
    /// Requester of an employee request, or claimant of a posting.
    pub owner: Option<u64>,
    pub statuses: Vec<ShiftStatus>,
    pub date_from: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeOffOrder {
    #[default]
    NewestFirst,
    StartDate,
}

#[derive(Debug, Clone, Default)]
pub struct TimeOffQuery {
    pub employee_id: Option<u64>,
    pub status: Option<TimeOffStatus>,
    pub ends_from: Option<DateTime<Utc>>,
    pub order: TimeOffOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayrollOrder {
    /// Earliest period end first.
    #[default]
    PeriodEndAsc,
    PeriodEndDesc,
}

#[derive(Debug, Clone, Default)]
pub struct PayrollQuery {
    pub employee_id: Option<u64>,
    pub statuses: Vec<PayrollStatus>,
    pub period_end_from: Option<DateTime<Utc>>,
    pub order: PayrollOrder,
    pub limit: Option<u32>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // users
    /// Fails with [`StoreError::Conflict`] when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn count_users(&self, role: Role) -> StoreResult<u64>;
    /// Every stored email, row by row.
    fn email_stream(&self) -> BoxStream<'_, StoreResult<String>>;

    // shifts
    async fn insert_shift(&self, shift: NewShift) -> StoreResult<Shift>;
    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>>;
    /// Sorted by date, earliest first.
    async fn list_shifts(&self, query: &ShiftQuery) -> StoreResult<Vec<Shift>>;
    async fn count_shifts(&self, query: &ShiftQuery) -> StoreResult<u64>;
    /// Moves a pending employee request to `to`.
    async fn review_shift_request(
        &self,
        id: u64,
        to: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;
    /// Open posting -> taken by `employee_id`. At most one caller ever wins.
    async fn claim_open_shift(&self, id: u64, employee_id: u64, at: DateTime<Utc>)
    -> StoreResult<bool>;
    /// Deletes an employee request only while it is pending and owned by `requested_by`.
    async fn delete_pending_request(&self, id: u64, requested_by: u64) -> StoreResult<bool>;
    async fn delete_shift(&self, id: u64) -> StoreResult<bool>;

    // time off
    async fn insert_time_off(&self, request: NewTimeOff) -> StoreResult<TimeOffRequest>;
    async fn find_time_off(&self, id: u64) -> StoreResult<Option<TimeOffRequest>>;
    async fn list_time_off(&self, query: &TimeOffQuery) -> StoreResult<Vec<TimeOffRequest>>;
    async fn count_time_off(&self, query: &TimeOffQuery) -> StoreResult<u64>;
    /// Applies a review to a pending request.
    async fn review_time_off(&self, id: u64, review: TimeOffReview) -> StoreResult<bool>;
    /// Deletes a request only while pending and owned by `employee_id`.
    async fn delete_pending_time_off(&self, id: u64, employee_id: u64) -> StoreResult<bool>;

    // payroll
    async fn insert_payroll(&self, payroll: NewPayroll) -> StoreResult<Payroll>;
    async fn find_payroll(&self, id: u64) -> StoreResult<Option<Payroll>>;
    async fn list_payroll(&self, query: &PayrollQuery) -> StoreResult<Vec<Payroll>>;
    async fn count_payroll(&self, status: PayrollStatus) -> StoreResult<u64>;
    /// Replaces the figures of a pending record.
    async fn update_pending_payroll(
        &self,
        id: u64,
        figures: PayrollFigures,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;
    async fn approve_payroll(&self, id: u64, approved_by: u64, at: DateTime<Utc>)
    -> StoreResult<bool>;
    async fn mark_payroll_paid(&self, id: u64, paid_on: DateTime<Utc>) -> StoreResult<bool>;
}
