use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::policy::{AdminId, EmployeeId},
    error::AppError,
    lifecycle::non_blank,
    model::shift::{
        NewShift, PostingStatus, RequestStatus, Shift, ShiftKind, ShiftOrigin, ShiftStatus,
        ShiftType, ShiftView,
    },
    store::{ShiftQuery, Store},
    utils::time::midday,
};

/// An admin-posted slot. Times default to the shift type's fixed hours.
#[derive(Debug, Clone)]
pub struct ShiftPosting {
    pub shift_type: ShiftType,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShiftRequest {
    pub shift_type: ShiftType,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

pub async fn post_open_shift(
    store: &dyn Store,
    admin: AdminId,
    posting: ShiftPosting,
    now: DateTime<Utc>,
) -> Result<Shift, AppError> {
    let (default_start, default_end) = posting.shift_type.default_hours();

    let shift = store
        .insert_shift(NewShift {
            shift_type: posting.shift_type,
            date: midday(posting.date),
            location: non_blank(posting.location),
            notes: non_blank(posting.notes),
            posted_by: admin.get(),
            kind: ShiftKind::AdminPosted {
                start_time: posting.start_time.unwrap_or(default_start),
                end_time: posting.end_time.unwrap_or(default_end),
                status: PostingStatus::Open,
                assigned_to: None,
            },
            created_at: now,
        })
        .await?;

    info!(
        shift_id = shift.id,
        admin_id = admin.get(),
        shift_type = %shift.shift_type,
        "Open shift posted"
    );
    Ok(shift)
}

pub async fn request_shift(
    store: &dyn Store,
    employee: EmployeeId,
    request: ShiftRequest,
    now: DateTime<Utc>,
) -> Result<Shift, AppError> {
    let date = midday(request.date);
    if date < now {
        return Err(AppError::Validation(
            "Cannot request shifts in the past".into(),
        ));
    }

    let shift = store
        .insert_shift(NewShift {
            shift_type: request.shift_type,
            date,
            location: None,
            notes: non_blank(request.notes),
            posted_by: employee.get(),
            kind: ShiftKind::EmployeeRequested {
                requested_by: employee.get(),
                status: RequestStatus::Pending,
            },
            created_at: now,
        })
        .await?;

    info!(shift_id = shift.id, employee_id = employee.get(), "Shift requested");
    Ok(shift)
}

/// Decides a pending employee request. `decision` must be approved or denied.
pub async fn review_request(
    store: &dyn Store,
    admin: AdminId,
    shift_id: u64,
    decision: RequestStatus,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if decision == RequestStatus::Pending {
        return Err(AppError::Validation("A review must approve or deny".into()));
    }

    if !store.review_shift_request(shift_id, decision, now).await? {
        return Err(AppError::NotFound("Shift request not found".into()));
    }

    info!(shift_id, admin_id = admin.get(), decision = %decision, "Shift request reviewed");
    Ok(())
}

pub async fn withdraw_request(
    store: &dyn Store,
    employee: EmployeeId,
    shift_id: u64,
) -> Result<(), AppError> {
    if !store.delete_pending_request(shift_id, employee.get()).await? {
        return Err(AppError::NotFound(
            "Request not found or cannot be deleted".into(),
        ));
    }

    info!(shift_id, employee_id = employee.get(), "Shift request withdrawn");
    Ok(())
}

/// First claimant wins; everyone after sees the shift as gone.
pub async fn take_open_shift(
    store: &dyn Store,
    employee: EmployeeId,
    shift_id: u64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !store.claim_open_shift(shift_id, employee.get(), now).await? {
        return Err(AppError::NotFound(
            "Shift not found or no longer available".into(),
        ));
    }

    info!(shift_id, employee_id = employee.get(), "Open shift taken");
    Ok(())
}

pub async fn delete_shift(
    store: &dyn Store,
    admin: AdminId,
    shift_id: u64,
) -> Result<(), AppError> {
    if !store.delete_shift(shift_id).await? {
        return Err(AppError::NotFound("Shift not found".into()));
    }

    info!(shift_id, admin_id = admin.get(), "Shift deleted");
    Ok(())
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub denied: usize,
}

impl StatusCounts {
    fn tally(shifts: &[Shift]) -> Self {
        shifts
            .iter()
            .fold(Self::default(), |mut counts, shift| {
                match shift.status() {
                    ShiftStatus::Pending => counts.pending += 1,
                    ShiftStatus::Approved => counts.approved += 1,
                    ShiftStatus::Denied => counts.denied += 1,
                    ShiftStatus::Open | ShiftStatus::Taken => {}
                }
                counts
            })
    }
}

fn views(shifts: &[Shift]) -> Vec<ShiftView> {
    shifts.iter().map(ShiftView::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeShifts {
    pub my_requests: Vec<ShiftView>,
    pub request_counts: StatusCounts,
    /// Admin postings dated from now on.
    pub posted_shifts: Vec<ShiftView>,
    pub open_count: usize,
    pub taken_by_me_count: usize,
    /// Approved requests and taken postings belonging to the caller.
    pub upcoming_schedule: Vec<ShiftView>,
}

pub async fn employee_shifts(
    store: &dyn Store,
    employee: EmployeeId,
    now: DateTime<Utc>,
) -> Result<EmployeeShifts, AppError> {
    let me = employee.get();

    let my_requests = store
        .list_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::EmployeeRequest),
            owner: Some(me),
            ..Default::default()
        })
        .await?;

    let posted = store
        .list_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::AdminPosted),
            date_from: Some(now),
            ..Default::default()
        })
        .await?;

    let upcoming = store
        .list_shifts(&ShiftQuery {
            owner: Some(me),
            statuses: vec![ShiftStatus::Approved, ShiftStatus::Taken],
            date_from: Some(now),
            ..Default::default()
        })
        .await?;

    Ok(EmployeeShifts {
        request_counts: StatusCounts::tally(&my_requests),
        my_requests: views(&my_requests),
        open_count: posted
            .iter()
            .filter(|s| s.status() == ShiftStatus::Open)
            .count(),
        taken_by_me_count: posted
            .iter()
            .filter(|s| s.status() == ShiftStatus::Taken && s.owner() == Some(me))
            .count(),
        posted_shifts: views(&posted),
        upcoming_schedule: views(&upcoming),
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminShifts {
    pub employee_requests: Vec<ShiftView>,
    pub request_counts: StatusCounts,
    pub posted_shifts: Vec<ShiftView>,
    pub open_count: usize,
    pub taken_count: usize,
    /// Every approved request and taken posting.
    pub scheduled: Vec<ShiftView>,
}

pub async fn admin_shifts(store: &dyn Store, _admin: AdminId) -> Result<AdminShifts, AppError> {
    let requests = store
        .list_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::EmployeeRequest),
            ..Default::default()
        })
        .await?;

    let posted = store
        .list_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::AdminPosted),
            ..Default::default()
        })
        .await?;

    let scheduled = store
        .list_shifts(&ShiftQuery {
            statuses: vec![ShiftStatus::Approved, ShiftStatus::Taken],
            ..Default::default()
        })
        .await?;

    let count = |status: ShiftStatus| posted.iter().filter(|s| s.status() == status).count();

    Ok(AdminShifts {
        request_counts: StatusCounts::tally(&requests),
        employee_requests: views(&requests),
        open_count: count(ShiftStatus::Open),
        taken_count: count(ShiftStatus::Taken),
        posted_shifts: views(&posted),
        scheduled: views(&scheduled),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{at, day};
    use crate::store::MemoryStore;
    use crate::utils::time::{clock, display_time};

    const ADMIN: u64 = 1;

    fn admin() -> AdminId {
        AdminId::for_tests(ADMIN)
    }

    fn employee(id: u64) -> EmployeeId {
        EmployeeId::for_tests(id)
    }

    fn posting(shift_type: ShiftType, date: NaiveDate) -> ShiftPosting {
        ShiftPosting {
            shift_type,
            date,
            start_time: None,
            end_time: None,
            location: None,
            notes: None,
        }
    }

    fn request(date: NaiveDate) -> ShiftRequest {
        ShiftRequest {
            shift_type: ShiftType::Morning,
            date,
            notes: None,
        }
    }

    #[actix_web::test]
    async fn weekend_posting_uses_default_hours() {
        let store = MemoryStore::new();
        let shift = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Weekend, day(2025, 12, 21)),
            at(2025, 12, 1, 9),
        )
        .await
        .unwrap();

        let view = ShiftView::from(&shift);
        assert_eq!(view.start_time.as_deref(), Some("9:00 AM"));
        assert_eq!(view.end_time.as_deref(), Some("5:00 PM"));
        assert_eq!(view.status, ShiftStatus::Open);
        assert!(!view.is_employee_request);
        assert_eq!(shift.date, at(2025, 12, 21, 12));
        assert_eq!(shift.posted_by, ADMIN);
    }

    #[actix_web::test]
    async fn explicit_times_override_the_table() {
        let store = MemoryStore::new();
        let mut input = posting(ShiftType::Morning, day(2025, 12, 22));
        input.start_time = Some(clock(6, 30));
        input.location = Some("  ".into());
        let shift = post_open_shift(&store, admin(), input, at(2025, 12, 1, 9))
            .await
            .unwrap();

        match shift.kind {
            ShiftKind::AdminPosted {
                start_time,
                end_time,
                ..
            } => {
                assert_eq!(display_time(start_time), "6:30 AM");
                assert_eq!(display_time(end_time), "4:00 PM");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(shift.location, None);
    }

    #[actix_web::test]
    async fn request_dated_yesterday_is_rejected() {
        let store = MemoryStore::new();
        let err = request_shift(
            &store,
            employee(2),
            request(day(2025, 12, 9)),
            at(2025, 12, 10, 8),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Cannot request shifts in the past");
        assert_eq!(store.count_shifts(&ShiftQuery::default()).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn request_is_pending_until_reviewed_once() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let shift = request_shift(&store, employee(2), request(day(2025, 12, 20)), now)
            .await
            .unwrap();
        assert_eq!(shift.status(), ShiftStatus::Pending);
        assert_eq!(shift.owner(), Some(2));

        review_request(&store, admin(), shift.id, RequestStatus::Approved, now)
            .await
            .unwrap();
        let stored = store.find_shift(shift.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ShiftStatus::Approved);

        // approved is terminal
        let err = review_request(&store, admin(), shift.id, RequestStatus::Denied, now)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Shift request not found");
    }

    #[actix_web::test]
    async fn postings_cannot_be_reviewed_as_requests() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let shift = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Evening, day(2025, 12, 5)),
            now,
        )
        .await
        .unwrap();
        assert!(review_request(&store, admin(), shift.id, RequestStatus::Approved, now)
            .await
            .is_err());
    }

    #[actix_web::test]
    async fn only_owner_withdraws_and_only_while_pending() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let mine = request_shift(&store, employee(2), request(day(2025, 12, 20)), now)
            .await
            .unwrap();

        let err = withdraw_request(&store, employee(3), mine.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Request not found or cannot be deleted");

        let denied = request_shift(&store, employee(2), request(day(2025, 12, 21)), now)
            .await
            .unwrap();
        review_request(&store, admin(), denied.id, RequestStatus::Denied, now)
            .await
            .unwrap();
        assert!(withdraw_request(&store, employee(2), denied.id).await.is_err());

        withdraw_request(&store, employee(2), mine.id).await.unwrap();
        assert!(store.find_shift(mine.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn taking_a_shift_is_exclusive() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let shift = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Morning, day(2025, 12, 5)),
            now,
        )
        .await
        .unwrap();

        let (first, second) = futures::join!(
            take_open_shift(&store, employee(2), shift.id, now),
            take_open_shift(&store, employee(3), shift.id, now),
        );
        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let loser = first.err().or(second.err()).unwrap();
        assert_eq!(loser.to_string(), "Shift not found or no longer available");

        let stored = store.find_shift(shift.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ShiftStatus::Taken);
        assert!(matches!(stored.owner(), Some(2) | Some(3)));
    }

    #[actix_web::test]
    async fn second_taker_is_rejected_after_the_first() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let shift = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Weekend, day(2025, 12, 6)),
            now,
        )
        .await
        .unwrap();

        take_open_shift(&store, employee(2), shift.id, now).await.unwrap();
        let stored = store.find_shift(shift.id).await.unwrap().unwrap();
        assert_eq!(stored.owner(), Some(2));

        assert!(take_open_shift(&store, employee(3), shift.id, now).await.is_err());
        let stored = store.find_shift(shift.id).await.unwrap().unwrap();
        assert_eq!(stored.owner(), Some(2));
    }

    #[actix_web::test]
    async fn employee_requests_cannot_be_taken() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let req = request_shift(&store, employee(2), request(day(2025, 12, 20)), now)
            .await
            .unwrap();
        assert!(take_open_shift(&store, employee(3), req.id, now).await.is_err());
    }

    #[actix_web::test]
    async fn admin_deletes_any_shift() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let shift = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Morning, day(2025, 12, 5)),
            now,
        )
        .await
        .unwrap();
        take_open_shift(&store, employee(2), shift.id, now).await.unwrap();

        delete_shift(&store, admin(), shift.id).await.unwrap();
        assert!(delete_shift(&store, admin(), shift.id).await.is_err());
    }

    #[actix_web::test]
    async fn employee_view_splits_requests_postings_and_schedule() {
        let store = MemoryStore::new();
        let earlier = at(2025, 12, 1, 9);
        let now = at(2025, 12, 10, 9);
        let me = employee(2);

        let approved = request_shift(&store, me, request(day(2025, 12, 20)), earlier)
            .await
            .unwrap();
        review_request(&store, admin(), approved.id, RequestStatus::Approved, earlier)
            .await
            .unwrap();
        request_shift(&store, me, request(day(2025, 12, 15)), earlier)
            .await
            .unwrap();
        request_shift(&store, employee(3), request(day(2025, 12, 15)), earlier)
            .await
            .unwrap();

        // past posting is not listed
        post_open_shift(&store, admin(), posting(ShiftType::Morning, day(2025, 12, 5)), earlier)
            .await
            .unwrap();
        let taken = post_open_shift(
            &store,
            admin(),
            posting(ShiftType::Evening, day(2025, 12, 12)),
            earlier,
        )
        .await
        .unwrap();
        take_open_shift(&store, me, taken.id, earlier).await.unwrap();
        post_open_shift(&store, admin(), posting(ShiftType::Weekend, day(2025, 12, 13)), earlier)
            .await
            .unwrap();

        let view = employee_shifts(&store, me, now).await.unwrap();
        assert_eq!(view.my_requests.len(), 2);
        assert_eq!(view.request_counts.pending, 1);
        assert_eq!(view.request_counts.approved, 1);
        assert_eq!(view.posted_shifts.len(), 2);
        assert_eq!(view.open_count, 1);
        assert_eq!(view.taken_by_me_count, 1);

        let schedule: Vec<u64> = view.upcoming_schedule.iter().map(|s| s.id).collect();
        assert_eq!(schedule, vec![taken.id, approved.id]);
    }

    #[actix_web::test]
    async fn admin_view_counts_everything() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let a = request_shift(&store, employee(2), request(day(2025, 12, 20)), now)
            .await
            .unwrap();
        let d = request_shift(&store, employee(3), request(day(2025, 12, 21)), now)
            .await
            .unwrap();
        review_request(&store, admin(), a.id, RequestStatus::Approved, now)
            .await
            .unwrap();
        review_request(&store, admin(), d.id, RequestStatus::Denied, now)
            .await
            .unwrap();
        let p = post_open_shift(&store, admin(), posting(ShiftType::Morning, day(2025, 12, 5)), now)
            .await
            .unwrap();
        post_open_shift(&store, admin(), posting(ShiftType::Morning, day(2025, 12, 6)), now)
            .await
            .unwrap();
        take_open_shift(&store, employee(2), p.id, now).await.unwrap();

        let view = admin_shifts(&store, admin()).await.unwrap();
        assert_eq!(view.request_counts.approved, 1);
        assert_eq!(view.request_counts.denied, 1);
        assert_eq!(view.open_count, 1);
        assert_eq!(view.taken_count, 1);
        assert_eq!(view.scheduled.len(), 2);
    }
}
