use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream::{self, BoxStream}};

use super::{
    PayrollOrder, PayrollQuery, ShiftQuery, Store, StoreError, StoreResult, TimeOffOrder,
    TimeOffQuery,
};
use crate::model::{
    payroll::{NewPayroll, Payroll, PayrollFigures, PayrollStatus},
    role::Role,
    shift::{NewShift, PostingStatus, RequestStatus, Shift, ShiftKind},
    time_off::{NewTimeOff, TimeOffRequest, TimeOffReview, TimeOffStatus},
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    users: BTreeMap<u64, User>,
    shifts: BTreeMap<u64, Shift>,
    time_off: BTreeMap<u64, TimeOffRequest>,
    payroll: BTreeMap<u64, Payroll>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store. One lock covers all tables, so each conditional
/// transition is atomic with respect to every other call.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".into()))
    }
}

fn shift_matches(shift: &Shift, q: &ShiftQuery) -> bool {
    q.origin.is_none_or(|o| shift.origin() == o)
        && q.owner.is_none_or(|o| shift.owner() == Some(o))
        && (q.statuses.is_empty() || q.statuses.contains(&shift.status()))
        && q.date_from.is_none_or(|d| shift.date >= d)
}

fn time_off_matches(r: &TimeOffRequest, q: &TimeOffQuery) -> bool {
    q.employee_id.is_none_or(|e| r.employee_id == e)
        && q.status.is_none_or(|s| r.status == s)
        && q.ends_from.is_none_or(|d| r.end_date >= d)
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock()?;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        let id = t.next_id();
        let record = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            phone: user.phone,
            hire_date: user.hire_date,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        t.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count_users(&self, role: Role) -> StoreResult<u64> {
        Ok(self.lock()?.users.values().filter(|u| u.role == role).count() as u64)
    }

    fn email_stream(&self) -> BoxStream<'_, StoreResult<String>> {
        match self.lock() {
            Ok(t) => {
                let emails: Vec<StoreResult<String>> =
                    t.users.values().map(|u| Ok(u.email.clone())).collect();
                stream::iter(emails).boxed()
            }
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    async fn insert_shift(&self, shift: NewShift) -> StoreResult<Shift> {
        let mut t = self.lock()?;
        let id = t.next_id();
        let record = Shift {
            id,
            shift_type: shift.shift_type,
            date: shift.date,
            location: shift.location,
            notes: shift.notes,
            posted_by: shift.posted_by,
            kind: shift.kind,
            created_at: shift.created_at,
            updated_at: shift.created_at,
        };
        t.shifts.insert(id, record.clone());
        Ok(record)
    }

    async fn find_shift(&self, id: u64) -> StoreResult<Option<Shift>> {
        Ok(self.lock()?.shifts.get(&id).cloned())
    }

    async fn list_shifts(&self, query: &ShiftQuery) -> StoreResult<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self
            .lock()?
            .shifts
            .values()
            .filter(|s| shift_matches(s, query))
            .cloned()
            .collect();
        shifts.sort_by_key(|s| (s.date, s.id));
        Ok(shifts)
    }

    async fn count_shifts(&self, query: &ShiftQuery) -> StoreResult<u64> {
        Ok(self
            .lock()?
            .shifts
            .values()
            .filter(|s| shift_matches(s, query))
            .count() as u64)
    }

    async fn review_shift_request(
        &self,
        id: u64,
        to: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.lock()?;
        let Some(shift) = t.shifts.get_mut(&id) else {
            return Ok(false);
        };
        match &mut shift.kind {
            ShiftKind::EmployeeRequested { status, .. } if *status == RequestStatus::Pending => {
                *status = to;
                shift.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn claim_open_shift(
        &self,
        id: u64,
        employee_id: u64,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.lock()?;
        let Some(shift) = t.shifts.get_mut(&id) else {
            return Ok(false);
        };
        match &mut shift.kind {
            ShiftKind::AdminPosted {
                status,
                assigned_to,
                ..
            } if *status == PostingStatus::Open => {
                *status = PostingStatus::Taken;
                *assigned_to = Some(employee_id);
                shift.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending_request(&self, id: u64, requested_by: u64) -> StoreResult<bool> {
        let mut t = self.lock()?;
        let deletable = matches!(
            t.shifts.get(&id),
            Some(Shift {
                kind: ShiftKind::EmployeeRequested {
                    requested_by: owner,
                    status: RequestStatus::Pending,
                },
                ..
            }) if *owner == requested_by
        );
        if deletable {
            t.shifts.remove(&id);
        }
        Ok(deletable)
    }

    async fn delete_shift(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock()?.shifts.remove(&id).is_some())
    }

    async fn insert_time_off(&self, request: NewTimeOff) -> StoreResult<TimeOffRequest> {
        let mut t = self.lock()?;
        let id = t.next_id();
        let record = TimeOffRequest {
            id,
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
        };
        t.time_off.insert(id, record.clone());
        Ok(record)
    }

    async fn find_time_off(&self, id: u64) -> StoreResult<Option<TimeOffRequest>> {
        Ok(self.lock()?.time_off.get(&id).cloned())
    }

    async fn list_time_off(&self, query: &TimeOffQuery) -> StoreResult<Vec<TimeOffRequest>> {
        let mut requests: Vec<TimeOffRequest> = self
            .lock()?
            .time_off
            .values()
            .filter(|r| time_off_matches(r, query))
            .cloned()
            .collect();
        match query.order {
            TimeOffOrder::NewestFirst => {
                requests.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
            }
            TimeOffOrder::StartDate => requests.sort_by_key(|r| (r.start_date, r.id)),
        }
        Ok(requests)
    }

    async fn count_time_off(&self, query: &TimeOffQuery) -> StoreResult<u64> {
        Ok(self
            .lock()?
            .time_off
            .values()
            .filter(|r| time_off_matches(r, query))
            .count() as u64)
    }

    async fn review_time_off(&self, id: u64, review: TimeOffReview) -> StoreResult<bool> {
        let mut t = self.lock()?;
        match t.time_off.get_mut(&id) {
            Some(r) if r.status == TimeOffStatus::Pending => {
                r.status = review.status;
                r.reviewed_by = Some(review.reviewed_by);
                r.reviewed_at = Some(review.reviewed_at);
                r.admin_notes = review.admin_notes;
                r.updated_at = review.reviewed_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending_time_off(&self, id: u64, employee_id: u64) -> StoreResult<bool> {
        let mut t = self.lock()?;
        let deletable = matches!(
            t.time_off.get(&id),
            Some(r) if r.employee_id == employee_id && r.status == TimeOffStatus::Pending
        );
        if deletable {
            t.time_off.remove(&id);
        }
        Ok(deletable)
    }

    async fn insert_payroll(&self, payroll: NewPayroll) -> StoreResult<Payroll> {
        let mut t = self.lock()?;
        let id = t.next_id();
        let record = Payroll {
            id,
            employee_id: payroll.employee_id,
            period_start: payroll.period_start,
            period_end: payroll.period_end,
            figures: payroll.figures,
            status: PayrollStatus::Pending,
            approved_by: None,
            paid_date: None,
            notes: payroll.notes,
            created_at: payroll.created_at,
            updated_at: payroll.created_at,
        };
        t.payroll.insert(id, record.clone());
        Ok(record)
    }

    async fn find_payroll(&self, id: u64) -> StoreResult<Option<Payroll>> {
        Ok(self.lock()?.payroll.get(&id).cloned())
    }

    async fn list_payroll(&self, query: &PayrollQuery) -> StoreResult<Vec<Payroll>> {
        let mut records: Vec<Payroll> = self
            .lock()?
            .payroll
            .values()
            .filter(|p| {
                query.employee_id.is_none_or(|e| p.employee_id == e)
                    && (query.statuses.is_empty() || query.statuses.contains(&p.status))
                    && query.period_end_from.is_none_or(|d| p.period_end >= d)
            })
            .cloned()
            .collect();
        match query.order {
            PayrollOrder::PeriodEndAsc => records.sort_by_key(|p| (p.period_end, p.id)),
            PayrollOrder::PeriodEndDesc => {
                records.sort_by(|a, b| (b.period_end, b.id).cmp(&(a.period_end, a.id)))
            }
        }
        if let Some(limit) = query.limit {
            records.truncate(limit as usize);
        }
        Ok(records)
    }

    async fn count_payroll(&self, status: PayrollStatus) -> StoreResult<u64> {
        Ok(self
            .lock()?
            .payroll
            .values()
            .filter(|p| p.status == status)
            .count() as u64)
    }

    async fn update_pending_payroll(
        &self,
        id: u64,
        figures: PayrollFigures,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.lock()?;
        match t.payroll.get_mut(&id) {
            Some(p) if p.status == PayrollStatus::Pending => {
                p.figures = figures;
                p.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approve_payroll(
        &self,
        id: u64,
        approved_by: u64,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.lock()?;
        match t.payroll.get_mut(&id) {
            Some(p) if p.status == PayrollStatus::Pending => {
                p.status = PayrollStatus::Approved;
                p.approved_by = Some(approved_by);
                p.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_payroll_paid(&self, id: u64, paid_on: DateTime<Utc>) -> StoreResult<bool> {
        let mut t = self.lock()?;
        match t.payroll.get_mut(&id) {
            Some(p) if p.status == PayrollStatus::Approved => {
                p.status = PayrollStatus::Paid;
                p.paid_date = Some(paid_on);
                p.updated_at = paid_on;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
