use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{
        auth::AuthUser,
        policy::{AccessGate, Operation},
    },
    error::AppError,
    lifecycle::payroll::next_payroll,
    model::{
        payroll::{Payroll, PayrollStatus},
        role::Role,
        shift::{ShiftOrigin, ShiftStatus},
        time_off::TimeOffStatus,
        user::UserProfile,
    },
    store::{ShiftQuery, Store, TimeOffQuery},
};

#[derive(Serialize, ToSchema)]
pub struct EmployeeDashboard {
    pub user: UserProfile,
    pub pending_time_off: u64,
    pub pending_shift_requests: u64,
    #[schema(nullable = true)]
    pub next_payroll: Option<Payroll>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminDashboard {
    pub user: UserProfile,
    pub pending_shift_requests: u64,
    pub pending_time_off: u64,
    pub total_employees: u64,
    pub pending_payroll: u64,
}

/// The session may outlive the account row only if the store was reset.
async fn profile_of(store: &dyn Store, auth: &AuthUser) -> Result<UserProfile, AppError> {
    store
        .find_user(auth.user_id)
        .await?
        .map(|u| UserProfile::from(&u))
        .ok_or(AppError::Unauthenticated)
}

#[utoipa::path(
    get,
    path = "/employee/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Pending counts and next payroll", body = EmployeeDashboard),
        (status = 403, description = "Employees only")
    )
)]
pub async fn employee_dashboard(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::EmployeeView)?;
    let store = store.get_ref();

    let pending_time_off = store
        .count_time_off(&TimeOffQuery {
            employee_id: Some(me.get()),
            status: Some(TimeOffStatus::Pending),
            ..Default::default()
        })
        .await?;

    let pending_shift_requests = store
        .count_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::EmployeeRequest),
            owner: Some(me.get()),
            statuses: vec![ShiftStatus::Pending],
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeDashboard {
        user: profile_of(store, &auth).await?,
        pending_time_off,
        pending_shift_requests,
        next_payroll: next_payroll(store, me, Utc::now()).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Organisation-wide pending counts", body = AdminDashboard),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_dashboard(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    gate.authorize_admin(&auth, Operation::AdminView)?;
    let store = store.get_ref();

    let pending_shift_requests = store
        .count_shifts(&ShiftQuery {
            origin: Some(ShiftOrigin::EmployeeRequest),
            statuses: vec![ShiftStatus::Pending],
            ..Default::default()
        })
        .await?;
    let pending_time_off = store
        .count_time_off(&TimeOffQuery {
            status: Some(TimeOffStatus::Pending),
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(AdminDashboard {
        user: profile_of(store, &auth).await?,
        pending_shift_requests,
        pending_time_off,
        total_employees: store.count_users(Role::Employee).await?,
        pending_payroll: store.count_payroll(PayrollStatus::Pending).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/employee/profile",
    tag = "Dashboard",
    responses((status = 200, description = "Caller's own account", body = UserProfile))
)]
pub async fn employee_profile(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    gate.authorize_employee(&auth, Operation::EmployeeView)?;
    Ok(HttpResponse::Ok().json(profile_of(store.get_ref(), &auth).await?))
}

#[utoipa::path(
    get,
    path = "/admin/profile",
    tag = "Dashboard",
    responses((status = 200, description = "Caller's own account", body = UserProfile))
)]
pub async fn admin_profile(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    gate.authorize_admin(&auth, Operation::AdminView)?;
    Ok(HttpResponse::Ok().json(profile_of(store.get_ref(), &auth).await?))
}
