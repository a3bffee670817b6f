use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::policy::{AdminId, EmployeeId},
    error::AppError,
    lifecycle::non_blank,
    model::{
        payroll::{NewPayroll, Payroll, PayrollFigures, PayrollStatus},
        role::Role,
    },
    store::{PayrollOrder, PayrollQuery, Store},
    utils::time::midday,
};

const HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct PayrollEntry {
    pub employee_id: u64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub hours_worked: f64,
    pub hourly_rate: f64,
    pub deductions: f64,
    pub notes: Option<String>,
}

fn figures(
    hours_worked: f64,
    hourly_rate: f64,
    deductions: f64,
) -> Result<PayrollFigures, AppError> {
    PayrollFigures::compute(hours_worked, hourly_rate, deductions).map_err(AppError::Validation)
}

pub async fn create(
    store: &dyn Store,
    admin: AdminId,
    entry: PayrollEntry,
    now: DateTime<Utc>,
) -> Result<Payroll, AppError> {
    if entry.period_start > entry.period_end {
        return Err(AppError::Validation(
            "Period start must not be after period end".into(),
        ));
    }
    let figures = figures(entry.hours_worked, entry.hourly_rate, entry.deductions)?;

    match store.find_user(entry.employee_id).await? {
        Some(user) if user.role == Role::Employee => {}
        _ => return Err(AppError::NotFound("Employee not found".into())),
    }

    let payroll = store
        .insert_payroll(NewPayroll {
            employee_id: entry.employee_id,
            period_start: midday(entry.period_start),
            period_end: midday(entry.period_end),
            figures,
            notes: non_blank(entry.notes),
            created_at: now,
        })
        .await?;

    info!(
        payroll_id = payroll.id,
        employee_id = payroll.employee_id,
        admin_id = admin.get(),
        net_pay = payroll.figures.net_pay(),
        "Payroll created"
    );
    Ok(payroll)
}

/// Recomputes gross and net pay from the new inputs. Only pending records change.
pub async fn update_figures(
    store: &dyn Store,
    admin: AdminId,
    payroll_id: u64,
    hours_worked: f64,
    hourly_rate: f64,
    deductions: f64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let figures = figures(hours_worked, hourly_rate, deductions)?;

    if !store.update_pending_payroll(payroll_id, figures, now).await? {
        return Err(AppError::NotFound("Payroll not found".into()));
    }

    info!(payroll_id, admin_id = admin.get(), net_pay = figures.net_pay(), "Payroll updated");
    Ok(())
}

pub async fn approve(
    store: &dyn Store,
    admin: AdminId,
    payroll_id: u64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !store.approve_payroll(payroll_id, admin.get(), now).await? {
        return Err(AppError::NotFound("Payroll not found".into()));
    }

    info!(payroll_id, admin_id = admin.get(), "Payroll approved");
    Ok(())
}

pub async fn mark_paid(
    store: &dyn Store,
    admin: AdminId,
    payroll_id: u64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !store.mark_payroll_paid(payroll_id, now).await? {
        return Err(AppError::NotFound("Payroll not found".into()));
    }

    info!(payroll_id, admin_id = admin.get(), "Payroll marked paid");
    Ok(())
}

/// Earliest payroll period that has not ended yet.
pub async fn next_payroll(
    store: &dyn Store,
    employee: EmployeeId,
    now: DateTime<Utc>,
) -> Result<Option<Payroll>, AppError> {
    let mut upcoming = store
        .list_payroll(&PayrollQuery {
            employee_id: Some(employee.get()),
            period_end_from: Some(now),
            limit: Some(1),
            ..Default::default()
        })
        .await?;
    Ok(upcoming.pop())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeePayroll {
    #[schema(nullable = true)]
    pub upcoming: Option<Payroll>,
    /// Approved or paid, latest period first.
    pub history: Vec<Payroll>,
}

pub async fn employee_payroll(
    store: &dyn Store,
    employee: EmployeeId,
    now: DateTime<Utc>,
) -> Result<EmployeePayroll, AppError> {
    let history = store
        .list_payroll(&PayrollQuery {
            employee_id: Some(employee.get()),
            statuses: vec![PayrollStatus::Approved, PayrollStatus::Paid],
            order: PayrollOrder::PeriodEndDesc,
            limit: Some(HISTORY_LIMIT),
            ..Default::default()
        })
        .await?;

    Ok(EmployeePayroll {
        upcoming: next_payroll(store, employee, now).await?,
        history,
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminPayroll {
    pub pending: Vec<Payroll>,
    pub approved: Vec<Payroll>,
    pub paid: Vec<Payroll>,
}

pub async fn admin_payroll(store: &dyn Store, _admin: AdminId) -> Result<AdminPayroll, AppError> {
    let by_status = |status: PayrollStatus| PayrollQuery {
        statuses: vec![status],
        order: PayrollOrder::PeriodEndDesc,
        ..Default::default()
    };

    Ok(AdminPayroll {
        pending: store.list_payroll(&by_status(PayrollStatus::Pending)).await?,
        approved: store.list_payroll(&by_status(PayrollStatus::Approved)).await?,
        paid: store.list_payroll(&by_status(PayrollStatus::Paid)).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{at, day, user};
    use crate::store::MemoryStore;

    fn entry(employee_id: u64, start: NaiveDate, end: NaiveDate) -> PayrollEntry {
        PayrollEntry {
            employee_id,
            period_start: start,
            period_end: end,
            hours_worked: 80.0,
            hourly_rate: 25.0,
            deductions: 300.0,
            notes: None,
        }
    }

    fn assert_consistent(p: &Payroll) {
        let f = &p.figures;
        assert_eq!(f.gross_pay(), f.hours_worked() * f.hourly_rate());
        assert_eq!(f.net_pay(), f.gross_pay() - f.deductions());
    }

    #[actix_web::test]
    async fn create_derives_pay_and_checks_the_employee() {
        let store = MemoryStore::new();
        let boss = user(&store, "admin@company.com", Role::Admin).await;
        let john = user(&store, "john@example.com", Role::Employee).await;
        let admin = AdminId::for_tests(boss.id);
        let now = at(2025, 12, 1, 9);

        let payroll = create(
            &store,
            admin,
            entry(john.id, day(2025, 12, 1), day(2025, 12, 15)),
            now,
        )
        .await
        .unwrap();
        assert_eq!(payroll.status, PayrollStatus::Pending);
        assert_eq!(payroll.figures.gross_pay(), 2000.0);
        assert_eq!(payroll.figures.net_pay(), 1700.0);
        assert_consistent(&payroll);

        let err = create(&store, admin, entry(boss.id, day(2025, 12, 1), day(2025, 12, 15)), now)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Employee not found");
        assert!(create(&store, admin, entry(99, day(2025, 12, 1), day(2025, 12, 15)), now)
            .await
            .is_err());

        let err = create(&store, admin, entry(john.id, day(2025, 12, 15), day(2025, 12, 1)), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut negative = entry(john.id, day(2025, 12, 1), day(2025, 12, 15));
        negative.hours_worked = -1.0;
        assert!(matches!(
            create(&store, admin, negative, now).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[actix_web::test]
    async fn figures_stay_consistent_through_every_transition() {
        let store = MemoryStore::new();
        let john = user(&store, "john@example.com", Role::Employee).await;
        let admin = AdminId::for_tests(1);
        let now = at(2025, 12, 1, 9);
        let payroll = create(
            &store,
            admin,
            entry(john.id, day(2025, 12, 1), day(2025, 12, 15)),
            now,
        )
        .await
        .unwrap();

        update_figures(&store, admin, payroll.id, 75.0, 25.0, 280.0, now)
            .await
            .unwrap();
        let stored = store.find_payroll(payroll.id).await.unwrap().unwrap();
        assert_eq!(stored.figures.gross_pay(), 1875.0);
        assert_eq!(stored.figures.net_pay(), 1595.0);
        assert_consistent(&stored);

        approve(&store, admin, payroll.id, now).await.unwrap();
        let stored = store.find_payroll(payroll.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayrollStatus::Approved);
        assert_eq!(stored.approved_by, Some(1));
        assert_consistent(&stored);

        // figures are frozen once approved
        assert!(update_figures(&store, admin, payroll.id, 1.0, 1.0, 0.0, now)
            .await
            .is_err());
        assert!(approve(&store, admin, payroll.id, now).await.is_err());

        mark_paid(&store, admin, payroll.id, at(2025, 12, 16, 9)).await.unwrap();
        let stored = store.find_payroll(payroll.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayrollStatus::Paid);
        assert_eq!(stored.paid_date, Some(at(2025, 12, 16, 9)));
        assert_consistent(&stored);

        assert!(mark_paid(&store, admin, payroll.id, now).await.is_err());
    }

    #[actix_web::test]
    async fn pending_payroll_cannot_be_paid() {
        let store = MemoryStore::new();
        let john = user(&store, "john@example.com", Role::Employee).await;
        let admin = AdminId::for_tests(1);
        let now = at(2025, 12, 1, 9);
        let payroll = create(
            &store,
            admin,
            entry(john.id, day(2025, 12, 1), day(2025, 12, 15)),
            now,
        )
        .await
        .unwrap();
        let err = mark_paid(&store, admin, payroll.id, now).await.unwrap_err();
        assert_eq!(err.to_string(), "Payroll not found");
    }

    #[actix_web::test]
    async fn employee_view_shows_next_period_and_history() {
        let store = MemoryStore::new();
        let john = user(&store, "john@example.com", Role::Employee).await;
        let jane = user(&store, "jane@example.com", Role::Employee).await;
        let admin = AdminId::for_tests(1);
        let now = at(2025, 12, 5, 9);

        let paid = create(&store, admin, entry(john.id, day(2025, 11, 1), day(2025, 11, 15)), now)
            .await
            .unwrap();
        approve(&store, admin, paid.id, now).await.unwrap();
        mark_paid(&store, admin, paid.id, now).await.unwrap();
        let approved = create(
            &store,
            admin,
            entry(john.id, day(2025, 11, 16), day(2025, 11, 30)),
            now,
        )
        .await
        .unwrap();
        approve(&store, admin, approved.id, now).await.unwrap();
        let current = create(
            &store,
            admin,
            entry(john.id, day(2025, 12, 1), day(2025, 12, 15)),
            now,
        )
        .await
        .unwrap();
        create(&store, admin, entry(john.id, day(2025, 12, 16), day(2025, 12, 31)), now)
            .await
            .unwrap();
        create(&store, admin, entry(jane.id, day(2025, 12, 1), day(2025, 12, 10)), now)
            .await
            .unwrap();

        let view = employee_payroll(&store, EmployeeId::for_tests(john.id), now)
            .await
            .unwrap();
        assert_eq!(view.upcoming.map(|p| p.id), Some(current.id));
        let history: Vec<u64> = view.history.iter().map(|p| p.id).collect();
        assert_eq!(history, vec![approved.id, paid.id]);

        let grouped = admin_payroll(&store, admin).await.unwrap();
        assert_eq!(grouped.pending.len(), 3);
        assert_eq!(grouped.approved.len(), 1);
        assert_eq!(grouped.paid.len(), 1);
    }
}
