use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::{
        auth::AuthUser,
        policy::{AccessGate, Operation},
    },
    error::{AppError, see_other, submitted},
    lifecycle::time_off::{self, AdminTimeOff, EmployeeTimeOff, TimeOffSubmission},
    model::time_off::TimeOffStatus,
    store::Store,
};

#[derive(Deserialize, ToSchema)]
pub struct TimeOffForm {
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-12-28", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Vacation")]
    pub reason: String,
    #[schema(example = "Holiday vacation", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewForm {
    #[schema(nullable = true)]
    pub admin_notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/employee/timeoff",
    tag = "Time Off",
    responses(
        (
            status = 200,
            description = "Own requests and upcoming approved leave",
            body = EmployeeTimeOff
        ),
        (status = 403, description = "Employees only")
    )
)]
pub async fn employee_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::EmployeeView)?;
    let view = time_off::employee_time_off(store.get_ref(), me, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/employee/timeoff/request",
    tag = "Time Off",
    request_body(content = TimeOffForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Request submitted"),
        (status = 400, description = "Missing reason or start after end")
    )
)]
pub async fn request_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    form: Result<web::Form<TimeOffForm>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::RequestTimeOff)?;
    let form = submitted(form)?;

    time_off::submit(
        store.get_ref(),
        me,
        TimeOffSubmission {
            start_date: form.start_date,
            end_date: form.end_date,
            reason: form.reason,
            notes: form.notes,
        },
        Utc::now(),
    )
    .await?;

    Ok(see_other("/employee/timeoff"))
}

#[utoipa::path(
    post,
    path = "/employee/timeoff/{id}/cancel",
    tag = "Time Off",
    params(("id" = u64, Path, description = "Time-off request id")),
    responses(
        (status = 303, description = "Request canceled"),
        (status = 404, description = "Request not found or cannot be canceled")
    )
)]
pub async fn cancel_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::CancelTimeOff)?;
    time_off::cancel(store.get_ref(), me, path.into_inner()).await?;
    Ok(see_other("/employee/timeoff"))
}

#[utoipa::path(
    get,
    path = "/admin/timeoff",
    tag = "Time Off",
    responses(
        (status = 200, description = "Pending, approved and denied requests", body = AdminTimeOff),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::AdminView)?;
    let view = time_off::admin_time_off(store.get_ref(), admin).await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn review(
    auth: AuthUser,
    gate: &AccessGate,
    store: &dyn Store,
    id: u64,
    decision: TimeOffStatus,
    form: Option<web::Form<ReviewForm>>,
) -> Result<HttpResponse, AppError> {
    let op = match decision {
        TimeOffStatus::Denied => Operation::DenyTimeOff,
        _ => Operation::ApproveTimeOff,
    };
    let admin = gate.authorize_admin(&auth, op)?;
    let admin_notes = form.and_then(|f| f.into_inner().admin_notes);

    time_off::review(store, admin, id, decision, admin_notes, Utc::now()).await?;
    Ok(see_other("/admin/timeoff"))
}

#[utoipa::path(
    post,
    path = "/admin/timeoff/{id}/approve",
    tag = "Time Off",
    params(("id" = u64, Path, description = "Time-off request id")),
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Request approved"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn approve_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    form: Option<web::Form<ReviewForm>>,
) -> Result<HttpResponse, AppError> {
    review(auth, &gate, store.get_ref(), path.into_inner(), TimeOffStatus::Approved, form).await
}

#[utoipa::path(
    post,
    path = "/admin/timeoff/{id}/deny",
    tag = "Time Off",
    params(("id" = u64, Path, description = "Time-off request id")),
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Request denied and kept for history"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn deny_time_off(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    form: Option<web::Form<ReviewForm>>,
) -> Result<HttpResponse, AppError> {
    review(auth, &gate, store.get_ref(), path.into_inner(), TimeOffStatus::Denied, form).await
}
