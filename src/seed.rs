use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::info;

use crate::{
    auth::password::hash_password,
    model::{
        payroll::{NewPayroll, PayrollFigures},
        role::Role,
        shift::{NewShift, PostingStatus, RequestStatus, ShiftKind, ShiftType},
        time_off::{NewTimeOff, TimeOffReview, TimeOffStatus},
        user::{NewUser, User},
    },
    store::Store,
    utils::{
        email_registry::EmailRegistry,
        time::{clock, midday},
    },
};

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid seed date {year}-{month}-{day}"))
}

async fn seed_user(
    store: &dyn Store,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    phone: &str,
    hire_date: NaiveDate,
) -> Result<User> {
    let password_hash =
        hash_password(password).map_err(|e| anyhow!("failed to hash seed password: {e}"))?;

    Ok(store
        .insert_user(NewUser {
            name: name.into(),
            email: email.into(),
            password_hash,
            role,
            phone: Some(phone.into()),
            hire_date,
            created_at: Utc::now(),
        })
        .await?)
}

struct PayrollSeed {
    employee_id: u64,
    period: (NaiveDate, NaiveDate),
    hours_worked: f64,
    hourly_rate: f64,
    deductions: f64,
}

async fn seed_payroll(store: &dyn Store, seed: PayrollSeed) -> Result<u64> {
    let figures = PayrollFigures::compute(seed.hours_worked, seed.hourly_rate, seed.deductions)
        .map_err(anyhow::Error::msg)?;

    let payroll = store
        .insert_payroll(NewPayroll {
            employee_id: seed.employee_id,
            period_start: midday(seed.period.0),
            period_end: midday(seed.period.1),
            figures,
            notes: None,
            created_at: Utc::now(),
        })
        .await?;
    Ok(payroll.id)
}

/// Demo accounts and records. Does nothing when any user already exists.
///
/// Every account is recorded in `registry` so signup sees them as taken.
pub async fn seed_demo_data(store: &dyn Store, registry: &EmailRegistry) -> Result<bool> {
    if store.count_users(Role::Admin).await? + store.count_users(Role::Employee).await? > 0 {
        info!("Store already has users, skipping demo data");
        return Ok(false);
    }

    let now = Utc::now();

    let admin = seed_user(
        store,
        "Admin User",
        "admin@admin.com",
        "admin123",
        Role::Admin,
        "555-0001",
        now.date_naive(),
    )
    .await?;

    let mut employees = Vec::new();
    for (name, email, phone, hired) in [
        ("John Doe", "john@example.com", "555-0002", ymd(2024, 1, 15)?),
        ("Jane Smith", "jane@example.com", "555-0003", ymd(2024, 3, 20)?),
        ("Ally Hansen", "ally@example.com", "555-0004", ymd(2024, 2, 10)?),
    ] {
        let user = seed_user(store, name, email, "password123", Role::Employee, phone, hired);
        employees.push(user.await?);
    }
    let [john, jane, ally] = <[User; 3]>::try_from(employees)
        .map_err(|_| anyhow!("expected three seeded employees"))?;

    for user in [&admin, &john, &jane, &ally] {
        registry.record(&user.email).await;
    }

    // employee requests
    let request = |shift_type: ShiftType, date: DateTime<Utc>, requested_by: u64| NewShift {
        shift_type,
        date,
        location: None,
        notes: None,
        posted_by: requested_by,
        kind: ShiftKind::EmployeeRequested {
            requested_by,
            status: RequestStatus::Pending,
        },
        created_at: now,
    };
    store
        .insert_shift(request(ShiftType::Morning, midday(ymd(2025, 12, 15)?), john.id))
        .await?;
    let approved = store
        .insert_shift(request(ShiftType::Afternoon, midday(ymd(2025, 12, 20)?), jane.id))
        .await?;
    store
        .review_shift_request(approved.id, RequestStatus::Approved, now)
        .await?;

    // admin postings
    let posting = |shift_type: ShiftType,
                   date: DateTime<Utc>,
                   (start_time, end_time): (NaiveTime, NaiveTime),
                   location: &str| NewShift {
        shift_type,
        date,
        location: Some(location.to_string()),
        notes: None,
        posted_by: admin.id,
        kind: ShiftKind::AdminPosted {
            start_time,
            end_time,
            status: PostingStatus::Open,
            assigned_to: None,
        },
        created_at: now,
    };
    let evening = (clock(17, 0), clock(23, 0));
    let evening_date = midday(ymd(2025, 12, 18)?);
    store
        .insert_shift(posting(ShiftType::Evening, evening_date, evening, "Main Office"))
        .await?;
    let weekend = ShiftType::Weekend.default_hours();
    store
        .insert_shift(posting(ShiftType::Weekend, midday(ymd(2025, 12, 21)?), weekend, "Warehouse"))
        .await?;
    let morning = ShiftType::Morning.default_hours();
    let morning_date = midday(ymd(2025, 12, 22)?);
    let taken = store
        .insert_shift(posting(ShiftType::Morning, morning_date, morning, "Main Office"))
        .await?;
    store.claim_open_shift(taken.id, ally.id, now).await?;

    // time off
    let time_off = |employee_id: u64,
                    (start, end): (NaiveDate, NaiveDate),
                    reason: &str,
                    notes: Option<&str>| NewTimeOff {
        employee_id,
        start_date: midday(start),
        end_date: midday(end),
        reason: reason.to_string(),
        notes: notes.map(str::to_string),
        created_at: now,
    };
    store
        .insert_time_off(time_off(
            john.id,
            (ymd(2025, 12, 25)?, ymd(2025, 12, 28)?),
            "Vacation",
            Some("Holiday vacation"),
        ))
        .await?;
    let leave = store
        .insert_time_off(time_off(
            jane.id,
            (ymd(2025, 1, 5)?, ymd(2025, 1, 7)?),
            "Personal Leave",
            None,
        ))
        .await?;
    store
        .review_time_off(
            leave.id,
            TimeOffReview {
                status: TimeOffStatus::Approved,
                reviewed_by: admin.id,
                reviewed_at: now,
                admin_notes: Some("Approved - enjoy!".into()),
            },
        )
        .await?;
    store
        .insert_time_off(time_off(
            ally.id,
            (ymd(2025, 12, 12)?, ymd(2025, 12, 13)?),
            "Sick Leave",
            None,
        ))
        .await?;

    // payroll
    let first_half = (ymd(2025, 11, 1)?, ymd(2025, 11, 15)?);
    let second_half = (ymd(2025, 11, 16)?, ymd(2025, 11, 30)?);
    let paid_on = midday(ymd(2025, 11, 16)?);

    let december = (ymd(2025, 12, 1)?, ymd(2025, 12, 15)?);

    let mut ids = Vec::new();
    for (employee_id, period, hours_worked, hourly_rate, deductions) in [
        (john.id, first_half, 80.0, 25.0, 300.0),
        (john.id, second_half, 75.0, 25.0, 280.0),
        (jane.id, first_half, 85.0, 22.0, 275.0),
        (ally.id, second_half, 78.0, 23.5, 270.0),
        (john.id, december, 87.0, 25.0, 130.5),
    ] {
        let seed = PayrollSeed {
            employee_id,
            period,
            hours_worked,
            hourly_rate,
            deductions,
        };
        ids.push(seed_payroll(store, seed).await?);
    }
    let (john_paid, john_approved, jane_paid) = (ids[0], ids[1], ids[2]);

    for id in [john_paid, john_approved, jane_paid] {
        store.approve_payroll(id, admin.id, now).await?;
    }
    for id in [john_paid, jane_paid] {
        store.mark_payroll_paid(id, paid_on).await?;
    }

    info!(
        admin = %admin.email,
        employees = 3,
        "Demo data seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{payroll::PayrollStatus, shift::ShiftStatus};
    use crate::store::{MemoryStore, PayrollQuery, ShiftQuery, TimeOffQuery};

    #[actix_web::test]
    async fn seeds_once_with_consistent_records() {
        let store = MemoryStore::new();
        let registry = EmailRegistry::default();

        assert!(seed_demo_data(&store, &registry).await.unwrap());
        assert!(!seed_demo_data(&store, &registry).await.unwrap());

        assert_eq!(store.count_users(Role::Admin).await.unwrap(), 1);
        assert_eq!(store.count_users(Role::Employee).await.unwrap(), 3);
        assert!(!registry.is_available("jane@example.com", &store).await.unwrap());

        let shifts = store.list_shifts(&ShiftQuery::default()).await.unwrap();
        assert_eq!(shifts.len(), 5);
        assert_eq!(shifts.iter().filter(|s| s.status() == ShiftStatus::Open).count(), 2);
        assert_eq!(shifts.iter().filter(|s| s.status() == ShiftStatus::Taken).count(), 1);

        assert_eq!(store.list_time_off(&TimeOffQuery::default()).await.unwrap().len(), 3);

        let payroll = store.list_payroll(&PayrollQuery::default()).await.unwrap();
        assert_eq!(payroll.len(), 5);
        for p in &payroll {
            assert_eq!(p.figures.gross_pay(), p.figures.hours_worked() * p.figures.hourly_rate());
            assert_eq!(p.figures.net_pay(), p.figures.gross_pay() - p.figures.deductions());
        }
        assert_eq!(store.count_payroll(PayrollStatus::Paid).await.unwrap(), 2);
        assert_eq!(store.count_payroll(PayrollStatus::Approved).await.unwrap(), 1);
        assert_eq!(store.count_payroll(PayrollStatus::Pending).await.unwrap(), 2);
    }
}
