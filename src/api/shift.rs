use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::{
        auth::AuthUser,
        policy::{AccessGate, Operation},
    },
    error::{AppError, see_other, submitted},
    lifecycle::shift::{
        self, AdminShifts, EmployeeShifts, ShiftPosting, ShiftRequest,
    },
    model::shift::{RequestStatus, ShiftType},
    store::Store,
    utils::time::parse_clock,
};

#[derive(Deserialize, ToSchema)]
pub struct PostShiftForm {
    #[schema(example = "Weekend")]
    pub shift_type: ShiftType,
    #[schema(example = "2025-12-21", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// Defaults to the shift type's start time, e.g. `9:00 AM` or `09:00`
    #[schema(example = "9:00 AM", nullable = true)]
    pub start_time: Option<String>,
    #[schema(example = "5:00 PM", nullable = true)]
    pub end_time: Option<String>,
    #[schema(example = "Warehouse", nullable = true)]
    pub location: Option<String>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ShiftRequestForm {
    #[schema(example = "Morning")]
    pub shift_type: ShiftType,
    #[schema(example = "2025-12-20", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

fn optional_clock(value: Option<&str>, field: &str) -> Result<Option<NaiveTime>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_clock(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid {field}: {raw}"))),
    }
}

/* =========================
Employee
========================= */

#[utoipa::path(
    get,
    path = "/employee/shifts",
    tag = "Shifts",
    responses(
        (
            status = 200,
            description = "Own requests, upcoming postings and schedule",
            body = EmployeeShifts
        ),
        (status = 403, description = "Employees only")
    )
)]
pub async fn employee_shifts(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::EmployeeView)?;
    let view = shift::employee_shifts(store.get_ref(), me, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/employee/shifts/create-request",
    tag = "Shifts",
    request_body(content = ShiftRequestForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Request created"),
        (status = 400, description = "Date is in the past")
    )
)]
pub async fn request_shift(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    form: Result<web::Form<ShiftRequestForm>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::RequestShift)?;
    let form = submitted(form)?;

    shift::request_shift(
        store.get_ref(),
        me,
        ShiftRequest {
            shift_type: form.shift_type,
            date: form.date,
            notes: form.notes,
        },
        Utc::now(),
    )
    .await?;

    Ok(see_other("/employee/shifts"))
}

#[utoipa::path(
    post,
    path = "/employee/shifts/{id}/delete",
    tag = "Shifts",
    params(("id" = u64, Path, description = "Shift request id")),
    responses(
        (status = 303, description = "Request withdrawn"),
        (status = 404, description = "Request not found or cannot be deleted")
    )
)]
pub async fn withdraw_request(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::WithdrawShiftRequest)?;
    shift::withdraw_request(store.get_ref(), me, path.into_inner()).await?;
    Ok(see_other("/employee/shifts"))
}

#[utoipa::path(
    post,
    path = "/employee/shifts/{id}/take",
    tag = "Shifts",
    params(("id" = u64, Path, description = "Open shift id")),
    responses(
        (status = 303, description = "Shift taken"),
        (status = 404, description = "Shift not found or no longer available")
    )
)]
pub async fn take_shift(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::TakeShift)?;
    shift::take_open_shift(store.get_ref(), me, path.into_inner(), Utc::now()).await?;
    Ok(see_other("/employee/shifts"))
}

/* =========================
Admin
========================= */

#[utoipa::path(
    get,
    path = "/admin/shifts",
    tag = "Shifts",
    responses(
        (
            status = 200,
            description = "All requests, postings and scheduled shifts",
            body = AdminShifts
        ),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_shifts(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::AdminView)?;
    let view = shift::admin_shifts(store.get_ref(), admin).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/admin/shifts/create",
    tag = "Shifts",
    request_body(content = PostShiftForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Open shift posted"),
        (status = 400, description = "Invalid time")
    )
)]
pub async fn post_shift(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    form: Result<web::Form<PostShiftForm>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::PostShift)?;
    let form = submitted(form)?;

    let posting = ShiftPosting {
        shift_type: form.shift_type,
        date: form.date,
        start_time: optional_clock(form.start_time.as_deref(), "start time")?,
        end_time: optional_clock(form.end_time.as_deref(), "end time")?,
        location: form.location,
        notes: form.notes,
    };
    shift::post_open_shift(store.get_ref(), admin, posting, Utc::now()).await?;

    Ok(see_other("/admin/shifts"))
}

async fn review(
    auth: AuthUser,
    gate: &AccessGate,
    store: &dyn Store,
    id: u64,
    decision: RequestStatus,
) -> Result<HttpResponse, AppError> {
    let op = match decision {
        RequestStatus::Denied => Operation::DenyShiftRequest,
        _ => Operation::ApproveShiftRequest,
    };
    let admin = gate.authorize_admin(&auth, op)?;
    shift::review_request(store, admin, id, decision, Utc::now()).await?;
    Ok(see_other("/admin/shifts"))
}

#[utoipa::path(
    post,
    path = "/admin/shifts/{id}/approve",
    tag = "Shifts",
    params(("id" = u64, Path, description = "Shift request id")),
    responses(
        (status = 303, description = "Request approved"),
        (status = 404, description = "Shift request not found")
    )
)]
pub async fn approve_request(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    review(auth, &gate, store.get_ref(), path.into_inner(), RequestStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/admin/shifts/{id}/deny",
    tag = "Shifts",
    params(("id" = u64, Path, description = "Shift request id")),
    responses(
        (status = 303, description = "Request denied"),
        (status = 404, description = "Shift request not found")
    )
)]
pub async fn deny_request(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    review(auth, &gate, store.get_ref(), path.into_inner(), RequestStatus::Denied).await
}

#[utoipa::path(
    post,
    path = "/admin/shifts/{id}/delete",
    tag = "Shifts",
    params(("id" = u64, Path, description = "Shift id")),
    responses(
        (status = 303, description = "Shift deleted"),
        (status = 404, description = "Shift not found")
    )
)]
pub async fn delete_shift(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::DeleteShift)?;
    shift::delete_shift(store.get_ref(), admin, path.into_inner()).await?;
    Ok(see_other("/admin/shifts"))
}
