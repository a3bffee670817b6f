use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::policy::{AdminId, EmployeeId},
    error::AppError,
    lifecycle::non_blank,
    model::time_off::{NewTimeOff, TimeOffRequest, TimeOffReview, TimeOffStatus},
    store::{Store, TimeOffOrder, TimeOffQuery},
    utils::time::midday,
};

/// Column width of `time_off_requests.reason`.
const REASON_MAX_CHARS: usize = 255;

#[derive(Debug, Clone)]
pub struct TimeOffSubmission {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub notes: Option<String>,
}

pub async fn submit(
    store: &dyn Store,
    employee: EmployeeId,
    submission: TimeOffSubmission,
    now: DateTime<Utc>,
) -> Result<TimeOffRequest, AppError> {
    let reason = submission.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("A reason is required".into()));
    }
    if reason.chars().count() > REASON_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Reason must be at most {REASON_MAX_CHARS} characters"
        )));
    }
    if submission.start_date > submission.end_date {
        return Err(AppError::Validation(
            "Start date must not be after end date".into(),
        ));
    }

    let request = store
        .insert_time_off(NewTimeOff {
            employee_id: employee.get(),
            start_date: midday(submission.start_date),
            end_date: midday(submission.end_date),
            reason: reason.to_string(),
            notes: non_blank(submission.notes),
            created_at: now,
        })
        .await?;

    info!(request_id = request.id, employee_id = employee.get(), "Time off requested");
    Ok(request)
}

/// Approves or denies a pending request. Denied requests are kept.
pub async fn review(
    store: &dyn Store,
    admin: AdminId,
    request_id: u64,
    decision: TimeOffStatus,
    admin_notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if decision == TimeOffStatus::Pending {
        return Err(AppError::Validation("A review must approve or deny".into()));
    }

    let applied = store
        .review_time_off(
            request_id,
            TimeOffReview {
                status: decision,
                reviewed_by: admin.get(),
                reviewed_at: now,
                admin_notes: non_blank(admin_notes),
            },
        )
        .await?;
    if !applied {
        return Err(AppError::NotFound("Request not found".into()));
    }

    info!(request_id, admin_id = admin.get(), decision = %decision, "Time off reviewed");
    Ok(())
}

/// Withdraws the caller's own request while it is still pending.
pub async fn cancel(
    store: &dyn Store,
    employee: EmployeeId,
    request_id: u64,
) -> Result<(), AppError> {
    if !store.delete_pending_time_off(request_id, employee.get()).await? {
        return Err(AppError::NotFound(
            "Request not found or cannot be canceled".into(),
        ));
    }

    info!(request_id, employee_id = employee.get(), "Time off canceled");
    Ok(())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeTimeOff {
    /// Newest first.
    pub requests: Vec<TimeOffRequest>,
    /// Approved and not yet over, earliest start first.
    pub upcoming: Vec<TimeOffRequest>,
}

pub async fn employee_time_off(
    store: &dyn Store,
    employee: EmployeeId,
    now: DateTime<Utc>,
) -> Result<EmployeeTimeOff, AppError> {
    let requests = store
        .list_time_off(&TimeOffQuery {
            employee_id: Some(employee.get()),
            ..Default::default()
        })
        .await?;

    let upcoming = store
        .list_time_off(&TimeOffQuery {
            employee_id: Some(employee.get()),
            status: Some(TimeOffStatus::Approved),
            ends_from: Some(now),
            order: TimeOffOrder::StartDate,
        })
        .await?;

    Ok(EmployeeTimeOff { requests, upcoming })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminTimeOff {
    pub pending: Vec<TimeOffRequest>,
    pub approved: Vec<TimeOffRequest>,
    pub denied: Vec<TimeOffRequest>,
}

pub async fn admin_time_off(store: &dyn Store, _admin: AdminId) -> Result<AdminTimeOff, AppError> {
    let by_status = |status: TimeOffStatus, order: TimeOffOrder| TimeOffQuery {
        status: Some(status),
        order,
        ..Default::default()
    };

    Ok(AdminTimeOff {
        pending: store
            .list_time_off(&by_status(TimeOffStatus::Pending, TimeOffOrder::NewestFirst))
            .await?,
        approved: store
            .list_time_off(&by_status(TimeOffStatus::Approved, TimeOffOrder::StartDate))
            .await?,
        denied: store
            .list_time_off(&by_status(TimeOffStatus::Denied, TimeOffOrder::NewestFirst))
            .await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{at, day};
    use crate::store::MemoryStore;

    fn admin() -> AdminId {
        AdminId::for_tests(1)
    }

    fn employee(id: u64) -> EmployeeId {
        EmployeeId::for_tests(id)
    }

    fn vacation(start: NaiveDate, end: NaiveDate) -> TimeOffSubmission {
        TimeOffSubmission {
            start_date: start,
            end_date: end,
            reason: "Vacation".into(),
            notes: Some("Holiday vacation".into()),
        }
    }

    #[actix_web::test]
    async fn submission_is_validated_and_normalized() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);

        let err = submit(&store, employee(2), vacation(day(2025, 12, 28), day(2025, 12, 25)), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut blank = vacation(day(2025, 12, 25), day(2025, 12, 28));
        blank.reason = "   ".into();
        assert!(submit(&store, employee(2), blank, now).await.is_err());

        let mut wordy = vacation(day(2025, 12, 25), day(2025, 12, 28));
        wordy.reason = "x".repeat(REASON_MAX_CHARS + 1);
        let err = submit(&store, employee(2), wordy, now).await.unwrap_err();
        assert_eq!(err.to_string(), "Reason must be at most 255 characters");

        let mut full = vacation(day(2025, 12, 25), day(2025, 12, 28));
        full.reason = "é".repeat(REASON_MAX_CHARS);
        assert!(submit(&store, employee(2), full, now).await.is_ok());

        let request = submit(
            &store,
            employee(2),
            vacation(day(2025, 12, 25), day(2025, 12, 28)),
            now,
        )
        .await
        .unwrap();
        assert_eq!(request.status, TimeOffStatus::Pending);
        assert_eq!(request.start_date, at(2025, 12, 25, 12));
        assert_eq!(request.notes.as_deref(), Some("Holiday vacation"));
    }

    #[actix_web::test]
    async fn approval_records_reviewer() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let request = submit(
            &store,
            employee(2),
            vacation(day(2025, 12, 25), day(2025, 12, 28)),
            now,
        )
        .await
        .unwrap();

        review(&store, admin(), request.id, TimeOffStatus::Approved, Some("Enjoy".into()), now)
            .await
            .unwrap();
        let stored = store.find_time_off(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TimeOffStatus::Approved);
        assert_eq!(stored.reviewed_by, Some(1));
        assert_eq!(stored.reviewed_at, Some(now));
        assert_eq!(stored.admin_notes.as_deref(), Some("Enjoy"));

        // no second review, and the owner can no longer cancel
        assert!(review(&store, admin(), request.id, TimeOffStatus::Denied, None, now)
            .await
            .is_err());
        assert!(cancel(&store, employee(2), request.id).await.is_err());
    }

    #[actix_web::test]
    async fn denied_request_leaves_the_pending_set_for_good() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let request = submit(
            &store,
            employee(2),
            vacation(day(2025, 12, 25), day(2025, 12, 28)),
            now,
        )
        .await
        .unwrap();

        review(&store, admin(), request.id, TimeOffStatus::Denied, None, now)
            .await
            .unwrap();

        let view = admin_time_off(&store, admin()).await.unwrap();
        assert!(view.pending.is_empty());
        assert_eq!(view.denied.len(), 1);
        assert_eq!(view.denied[0].reviewed_by, Some(1));

        let err = review(&store, admin(), request.id, TimeOffStatus::Approved, None, now)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request not found");
    }

    #[actix_web::test]
    async fn only_the_owner_cancels_a_pending_request() {
        let store = MemoryStore::new();
        let now = at(2025, 12, 1, 9);
        let request = submit(
            &store,
            employee(2),
            vacation(day(2025, 12, 25), day(2025, 12, 28)),
            now,
        )
        .await
        .unwrap();

        let err = cancel(&store, employee(3), request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Request not found or cannot be canceled");

        cancel(&store, employee(2), request.id).await.unwrap();
        assert!(store.find_time_off(request.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn employee_view_lists_upcoming_approved_leave() {
        let store = MemoryStore::new();
        let me = employee(2);
        let past = submit(
            &store,
            me,
            vacation(day(2025, 11, 3), day(2025, 11, 4)),
            at(2025, 10, 1, 9),
        )
        .await
        .unwrap();
        let later = submit(
            &store,
            me,
            vacation(day(2026, 1, 5), day(2026, 1, 6)),
            at(2025, 11, 1, 9),
        )
        .await
        .unwrap();
        let sooner = submit(
            &store,
            me,
            vacation(day(2025, 12, 24), day(2025, 12, 26)),
            at(2025, 11, 2, 9),
        )
        .await
        .unwrap();
        submit(
            &store,
            employee(3),
            vacation(day(2025, 12, 24), day(2025, 12, 26)),
            at(2025, 11, 2, 9),
        )
        .await
        .unwrap();
        for id in [past.id, later.id, sooner.id] {
            review(&store, admin(), id, TimeOffStatus::Approved, None, at(2025, 11, 3, 9))
                .await
                .unwrap();
        }

        let view = employee_time_off(&store, me, at(2025, 12, 1, 9)).await.unwrap();
        let all: Vec<u64> = view.requests.iter().map(|r| r.id).collect();
        assert_eq!(all, vec![sooner.id, later.id, past.id]);
        let upcoming: Vec<u64> = view.upcoming.iter().map(|r| r.id).collect();
        assert_eq!(upcoming, vec![sooner.id, later.id]);
    }
}
