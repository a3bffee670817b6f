use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::{StreamExt, stream::BoxStream};
use sqlx::{FromRow, MySqlPool, mysql::MySqlArguments, query::QueryAs};

use super::{
    PayrollOrder, PayrollQuery, ShiftQuery, Store, StoreError, StoreResult, TimeOffOrder,
    TimeOffQuery,
};
use crate::model::{
    payroll::{NewPayroll, Payroll, PayrollFigures, PayrollStatus},
    role::Role,
    shift::{
        NewShift, PostingStatus, RequestStatus, Shift, ShiftKind, ShiftOrigin, ShiftStatus,
        ShiftType,
    },
    time_off::{NewTimeOff, TimeOffRequest, TimeOffReview, TimeOffStatus},
    user::{NewUser, User},
};

const DUPLICATE_KEY: &str = "23000";

const SHIFT_COLUMNS: &str = "id, shift_type, date, start_time, end_time, assigned_to, \
     requested_by, posted_by, status, is_employee_request, location, notes, created_at, updated_at";

const TIME_OFF_COLUMNS: &str = "id, employee_id, start_date, end_date, reason, notes, status, \
     reviewed_by, reviewed_at, admin_notes, created_at, updated_at";

const PAYROLL_COLUMNS: &str = "id, employee_id, period_start, period_end, hours_worked, \
     hourly_rate, deductions, status, approved_by, paid_date, notes, created_at, updated_at";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn corrupt(what: &str, id: u64, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{what} {id}: {detail}"))
}

// Helper enum for typed SQLx binding
#[derive(Debug, Clone, PartialEq)]
enum FilterValue {
    U64(u64),
    Str(String),
    Time(DateTime<Utc>),
    Bool(bool),
}

#[derive(Debug, Default)]
struct Filter {
    clauses: Vec<String>,
    args: Vec<FilterValue>,
}

impl Filter {
    fn push(&mut self, clause: &str, arg: FilterValue) {
        self.clauses.push(clause.to_string());
        self.args.push(arg);
    }

    fn push_in(&mut self, column: &str, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let marks = vec!["?"; values.len()].join(", ");
        self.clauses.push(format!("{column} IN ({marks})"));
        self.args.extend(values.into_iter().map(FilterValue::Str));
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn bind_all<'q, O>(
        &self,
        mut q: QueryAs<'q, sqlx::MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, sqlx::MySql, O, MySqlArguments> {
        for arg in &self.args {
            q = match arg.clone() {
                FilterValue::U64(v) => q.bind(v),
                FilterValue::Str(v) => q.bind(v),
                FilterValue::Time(v) => q.bind(v),
                FilterValue::Bool(v) => q.bind(v),
            };
        }
        q
    }
}

fn shift_filter(query: &ShiftQuery) -> Filter {
    let mut f = Filter::default();
    if let Some(origin) = query.origin {
        f.push(
            "is_employee_request = ?",
            FilterValue::Bool(origin == ShiftOrigin::EmployeeRequest),
        );
    }
    if let Some(owner) = query.owner {
        // requests are stored with assigned_to = requester
        f.push("assigned_to = ?", FilterValue::U64(owner));
    }
    f.push_in(
        "status",
        query.statuses.iter().map(ShiftStatus::to_string).collect(),
    );
    if let Some(from) = query.date_from {
        f.push("date >= ?", FilterValue::Time(from));
    }
    f
}

fn time_off_filter(query: &TimeOffQuery) -> Filter {
    let mut f = Filter::default();
    if let Some(employee_id) = query.employee_id {
        f.push("employee_id = ?", FilterValue::U64(employee_id));
    }
    if let Some(status) = query.status {
        f.push("status = ?", FilterValue::Str(status.to_string()));
    }
    if let Some(from) = query.ends_from {
        f.push("end_date >= ?", FilterValue::Time(from));
    }
    f
}

fn payroll_filter(query: &PayrollQuery) -> Filter {
    let mut f = Filter::default();
    if let Some(employee_id) = query.employee_id {
        f.push("employee_id = ?", FilterValue::U64(employee_id));
    }
    f.push_in(
        "status",
        query.statuses.iter().map(PayrollStatus::to_string).collect(),
    );
    if let Some(from) = query.period_end_from {
        f.push("period_end >= ?", FilterValue::Time(from));
    }
    f
}

#[derive(FromRow)]
struct UserRow {
    id: u64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    hire_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&r.role).map_err(|e| corrupt("user", r.id, e))?;
        Ok(User {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            role,
            phone: r.phone,
            hire_date: r.hire_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ShiftRow {
    id: u64,
    shift_type: String,
    date: DateTime<Utc>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    assigned_to: Option<u64>,
    requested_by: Option<u64>,
    posted_by: u64,
    status: String,
    is_employee_request: bool,
    location: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShiftRow> for Shift {
    type Error = StoreError;

    fn try_from(r: ShiftRow) -> Result<Self, Self::Error> {
        let shift_type =
            ShiftType::from_str(&r.shift_type).map_err(|e| corrupt("shift", r.id, e))?;

        let kind = if r.is_employee_request {
            ShiftKind::EmployeeRequested {
                requested_by: r
                    .requested_by
                    .ok_or_else(|| corrupt("shift", r.id, "request without requester"))?,
                status: RequestStatus::from_str(&r.status)
                    .map_err(|e| corrupt("shift", r.id, e))?,
            }
        } else {
            let (Some(start_time), Some(end_time)) = (r.start_time, r.end_time) else {
                return Err(corrupt("shift", r.id, "posting without start/end time"));
            };
            ShiftKind::AdminPosted {
                start_time,
                end_time,
                status: PostingStatus::from_str(&r.status)
                    .map_err(|e| corrupt("shift", r.id, e))?,
                assigned_to: r.assigned_to,
            }
        };

        Ok(Shift {
            id: r.id,
            shift_type,
            date: r.date,
            location: r.location,
            notes: r.notes,
            posted_by: r.posted_by,
            kind,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TimeOffRow {
    id: u64,
    employee_id: u64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    reason: String,
    notes: Option<String>,
    status: String,
    reviewed_by: Option<u64>,
    reviewed_at: Option<DateTime<Utc>>,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TimeOffRow> for TimeOffRequest {
    type Error = StoreError;

    fn try_from(r: TimeOffRow) -> Result<Self, Self::Error> {
        let status = TimeOffStatus::from_str(&r.status).map_err(|e| corrupt("time off", r.id, e))?;
        Ok(TimeOffRequest {
            id: r.id,
            employee_id: r.employee_id,
            start_date: r.start_date,
            end_date: r.end_date,
            reason: r.reason,
            notes: r.notes,
            status,
            reviewed_by: r.reviewed_by,
            reviewed_at: r.reviewed_at,
            admin_notes: r.admin_notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    hours_worked: f64,
    hourly_rate: f64,
    deductions: f64,
    status: String,
    approved_by: Option<u64>,
    paid_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PayrollRow> for Payroll {
    type Error = StoreError;

    fn try_from(r: PayrollRow) -> Result<Self, Self::Error> {
        // stored gross/net are never trusted on the way back in
        let figures = PayrollFigures::compute(r.hours_worked, r.hourly_rate, r.deductions)
            .map_err(|e| corrupt("payroll", r.id, e))?;
        let status = PayrollStatus::from_str(&r.status).map_err(|e| corrupt("payroll", r.id, e))?;
        Ok(Payroll {
            id: r.id,
            employee_id: r.employee_id,
            period_start: r.period_start,
            period_end: r.period_end,
            figures,
            status,
            approved_by: r.approved_by,
            paid_date: r.paid_date,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (name, email, password_hash, role, phone, hire_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.phone)
        .bind(user.hire_date)
        .bind(user.created_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(DUPLICATE_KEY) =>
            {
                return Err(StoreError::Conflict("Email already registered".into()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(User {
            id: result.last_insert_id(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone: user.phone,
            hire_date: user.hire_date,
            created_at: user.created_at,
            updated_at: user.created_at,
        })
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, phone, hire_date, created_at, updated_at \
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, phone, hire_date, created_at, updated_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn count_users(&self, role: Role) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    fn email_stream(&self) -> BoxStream<'_, StoreResult<String>> {
        sqlx::query_scalar::<_, String>("SELECT email FROM users")
            .fetch(&self.pool)
            .map(|row| row.map_err(StoreError::from))
            .boxed()
    }

    async fn insert_shift(&self, shift: NewShift) -> StoreResult<Shift> {
        let (start_time, end_time, assigned_to, requested_by, is_request) = match &shift.kind {
            ShiftKind::AdminPosted {
                start_time,
                end_time,
                assigned_to,
                ..
            } => (Some(*start_time), Some(*end_time), *assigned_to, None, false),
            ShiftKind::EmployeeRequested { requested_by, .. } => {
                (None, None, Some(*requested_by), Some(*requested_by), true)
            }
        };
        let status = match &shift.kind {
            ShiftKind::AdminPosted { status, .. } => ShiftStatus::from(*status),
            ShiftKind::EmployeeRequested { status, .. } => ShiftStatus::from(*status),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO shifts
                (shift_type, date, start_time, end_time, assigned_to, requested_by, posted_by,
                 status, is_employee_request, location, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(shift.shift_type.to_string())
        .bind(shift.date)
        .bind(start_time)
        .bind(end_time)
        .bind(assigned_to)
        .bind(requested_by)
        .bind(shift.posted_by)
        .bind(status.to_string())
        .bind(is_request)
        .bind(&shift.location)
        .bind(&shift.notes)
        .bind(shift.created_at)
        .bind(shift.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Shift {
            id: result.last_insert_id(),
            shift_type: shift.shift_type,
            date: shift.date,
            location: shift.location,
            notes: shift.notes,
            posted_by: shift.posted_by,
            kind: shift.kind,
            created_at: shift.created_at,
            updated_at: shift.created_at,
        })
    }

    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?");
        sqlx::query_as::<_, ShiftRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Shift::try_from)
            .transpose()
    }

    async fn list_shifts(&self, query: &ShiftQuery) -> StoreResult<Vec<Shift>> {
        let filter = shift_filter(query);
        let sql = format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts{} ORDER BY date ASC, id ASC",
            filter.where_sql()
        );
        let rows = filter
            .bind_all(sqlx::query_as::<_, ShiftRow>(&sql))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_shifts(&self, query: &ShiftQuery) -> StoreResult<u64> {
        let filter = shift_filter(query);
        let sql = format!("SELECT COUNT(*) FROM shifts{}", filter.where_sql());
        let (count,) = filter
            .bind_all(sqlx::query_as::<_, (i64,)>(&sql))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn review_shift_request(
        &self,
        id: u64,
        to: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE shifts
            SET status = ?, updated_at = ?
            WHERE id = ?
            AND is_employee_request = TRUE
            AND status = 'pending'
            "#,
        )
        .bind(to.to_string())
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn claim_open_shift(
        &self,
        id: u64,
        employee_id: u64,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        // check-and-set in one statement; a concurrent claimant matches zero rows
        let result = sqlx::query(
            r#"
            UPDATE shifts
            SET status = 'taken', assigned_to = ?, updated_at = ?
            WHERE id = ?
            AND is_employee_request = FALSE
            AND status = 'open'
            "#,
        )
        .bind(employee_id)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_pending_request(&self, id: u64, requested_by: u64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM shifts
            WHERE id = ?
            AND requested_by = ?
            AND is_employee_request = TRUE
            AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(requested_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_shift(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_time_off(&self, request: NewTimeOff) -> StoreResult<TimeOffRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO time_off_requests
                (employee_id, start_date, end_date, reason, notes, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(&request.notes)
        .bind(request.created_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(TimeOffRequest {
            id: result.last_insert_id(),
            employee_id: request.employee_id,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            notes: request.notes,
            status: TimeOffStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            created_at: request.created_at,
            updated_at: request.created_at,
        })
    }

    async fn find_time_off(&self, id: u64) -> StoreResult<Option<TimeOffRequest>> {
        let sql = format!("SELECT {TIME_OFF_COLUMNS} FROM time_off_requests WHERE id = ?");
        sqlx::query_as::<_, TimeOffRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(TimeOffRequest::try_from)
            .transpose()
    }

    async fn list_time_off(&self, query: &TimeOffQuery) -> StoreResult<Vec<TimeOffRequest>> {
        let filter = time_off_filter(query);
        let order = match query.order {
            TimeOffOrder::NewestFirst => "created_at DESC, id DESC",
            TimeOffOrder::StartDate => "start_date ASC, id ASC",
        };
        let sql = format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests{} ORDER BY {order}",
            filter.where_sql()
        );
        let rows = filter
            .bind_all(sqlx::query_as::<_, TimeOffRow>(&sql))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_time_off(&self, query: &TimeOffQuery) -> StoreResult<u64> {
        let filter = time_off_filter(query);
        let sql = format!("SELECT COUNT(*) FROM time_off_requests{}", filter.where_sql());
        let (count,) = filter
            .bind_all(sqlx::query_as::<_, (i64,)>(&sql))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn review_time_off(&self, id: u64, review: TimeOffReview) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE time_off_requests
            SET status = ?, reviewed_by = ?, reviewed_at = ?, admin_notes = ?, updated_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(review.status.to_string())
        .bind(review.reviewed_by)
        .bind(review.reviewed_at)
        .bind(&review.admin_notes)
        .bind(review.reviewed_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_pending_time_off(&self, id: u64, employee_id: u64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM time_off_requests
            WHERE id = ?
            AND employee_id = ?
            AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_payroll(&self, payroll: NewPayroll) -> StoreResult<Payroll> {
        let f = payroll.figures;
        let result = sqlx::query(
            r#"
            INSERT INTO payroll
                (employee_id, period_start, period_end, hours_worked, hourly_rate, gross_pay,
                 deductions, net_pay, status, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?)
            "#,
        )
        .bind(payroll.employee_id)
        .bind(payroll.period_start)
        .bind(payroll.period_end)
        .bind(f.hours_worked())
        .bind(f.hourly_rate())
        .bind(f.gross_pay())
        .bind(f.deductions())
        .bind(f.net_pay())
        .bind(&payroll.notes)
        .bind(payroll.created_at)
        .bind(payroll.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Payroll {
            id: result.last_insert_id(),
            employee_id: payroll.employee_id,
            period_start: payroll.period_start,
            period_end: payroll.period_end,
            figures: f,
            status: PayrollStatus::Pending,
            approved_by: None,
            paid_date: None,
            notes: payroll.notes,
            created_at: payroll.created_at,
            updated_at: payroll.created_at,
        })
    }

    async fn find_payroll(&self, id: u64) -> StoreResult<Option<Payroll>> {
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll WHERE id = ?");
        sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payroll::try_from)
            .transpose()
    }

    async fn list_payroll(&self, query: &PayrollQuery) -> StoreResult<Vec<Payroll>> {
        let filter = payroll_filter(query);
        let order = match query.order {
            PayrollOrder::PeriodEndAsc => "period_end ASC, id ASC",
            PayrollOrder::PeriodEndDesc => "period_end DESC, id DESC",
        };
        let limit = query
            .limit
            .map(|n| format!(" LIMIT {n}"))
            .unwrap_or_default();
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll{} ORDER BY {order}{limit}",
            filter.where_sql()
        );
        let rows = filter
            .bind_all(sqlx::query_as::<_, PayrollRow>(&sql))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_payroll(&self, status: PayrollStatus) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payroll WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn update_pending_payroll(
        &self,
        id: u64,
        figures: PayrollFigures,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET hours_worked = ?, hourly_rate = ?, gross_pay = ?, deductions = ?, net_pay = ?,
                updated_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(figures.hours_worked())
        .bind(figures.hourly_rate())
        .bind(figures.gross_pay())
        .bind(figures.deductions())
        .bind(figures.net_pay())
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn approve_payroll(
        &self,
        id: u64,
        approved_by: u64,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET status = 'approved', approved_by = ?, updated_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(approved_by)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_payroll_paid(&self, id: u64, paid_on: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET status = 'paid', paid_date = ?, updated_at = ?
            WHERE id = ?
            AND status = 'approved'
            "#,
        )
        .bind(paid_on)
        .bind(paid_on)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        assert_eq!(shift_filter(&ShiftQuery::default()).where_sql(), "");
    }

    #[test]
    fn shift_filter_binds_in_clause_order() {
        let from = Utc::now();
        let f = shift_filter(&ShiftQuery {
            origin: Some(ShiftOrigin::AdminPosted),
            owner: Some(7),
            statuses: vec![ShiftStatus::Open, ShiftStatus::Taken],
            date_from: Some(from),
        });
        assert_eq!(
            f.where_sql(),
            " WHERE is_employee_request = ? AND assigned_to = ? AND status IN (?, ?) AND date >= ?"
        );
        assert_eq!(
            f.args,
            vec![
                FilterValue::Bool(false),
                FilterValue::U64(7),
                FilterValue::Str("open".into()),
                FilterValue::Str("taken".into()),
                FilterValue::Time(from),
            ]
        );
    }

    #[test]
    fn payroll_filter_skips_empty_status_list() {
        let f = payroll_filter(&PayrollQuery {
            employee_id: Some(3),
            ..Default::default()
        });
        assert_eq!(f.where_sql(), " WHERE employee_id = ?");
    }

    #[test]
    fn posting_row_without_times_is_corrupt() {
        let now = Utc::now();
        let row = ShiftRow {
            id: 9,
            shift_type: "Evening".into(),
            date: now,
            start_time: None,
            end_time: None,
            assigned_to: None,
            requested_by: None,
            posted_by: 1,
            status: "open".into(),
            is_employee_request: false,
            location: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Shift::try_from(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn payroll_row_recomputes_pay() {
        let now = Utc::now();
        let row = PayrollRow {
            id: 1,
            employee_id: 2,
            period_start: now,
            period_end: now,
            hours_worked: 75.0,
            hourly_rate: 25.0,
            deductions: 280.0,
            status: "approved".into(),
            approved_by: Some(1),
            paid_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let payroll = Payroll::try_from(row).unwrap();
        assert_eq!(payroll.figures.gross_pay(), 1875.0);
        assert_eq!(payroll.figures.net_pay(), 1595.0);
    }
}
