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
    lifecycle::payroll::{self, AdminPayroll, EmployeePayroll, PayrollEntry},
    store::Store,
};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayrollForm {
    #[schema(example = 2)]
    pub employee_id: u64,
    #[schema(example = "2025-12-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,
    #[schema(example = "2025-12-15", format = "date", value_type = String)]
    pub period_end: NaiveDate,
    #[schema(example = 80.0)]
    pub hours_worked: f64,
    #[schema(example = 25.0)]
    pub hourly_rate: f64,
    #[serde(default)]
    #[schema(example = 300.0)]
    pub deductions: f64,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

/// Gross and net pay are always derived from these.
#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollForm {
    #[schema(example = 75.0)]
    pub hours_worked: f64,
    #[schema(example = 25.0)]
    pub hourly_rate: f64,
    #[serde(default)]
    #[schema(example = 280.0)]
    pub deductions: f64,
}

#[utoipa::path(
    get,
    path = "/employee/payroll",
    tag = "Payroll",
    responses(
        (status = 200, description = "Next period and payment history", body = EmployeePayroll),
        (status = 403, description = "Employees only")
    )
)]
pub async fn employee_payroll(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let me = gate.authorize_employee(&auth, Operation::EmployeeView)?;
    let view = payroll::employee_payroll(store.get_ref(), me, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    get,
    path = "/admin/payroll",
    tag = "Payroll",
    responses(
        (status = 200, description = "All payroll grouped by status", body = AdminPayroll),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_payroll(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::AdminView)?;
    let view = payroll::admin_payroll(store.get_ref(), admin).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/admin/payroll/create",
    tag = "Payroll",
    request_body(content = CreatePayrollForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Payroll created as pending"),
        (status = 400, description = "Invalid period or figures"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn create_payroll(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    form: Result<web::Form<CreatePayrollForm>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::CreatePayroll)?;
    let form = submitted(form)?;

    payroll::create(
        store.get_ref(),
        admin,
        PayrollEntry {
            employee_id: form.employee_id,
            period_start: form.period_start,
            period_end: form.period_end,
            hours_worked: form.hours_worked,
            hourly_rate: form.hourly_rate,
            deductions: form.deductions,
            notes: form.notes,
        },
        Utc::now(),
    )
    .await?;

    Ok(see_other("/admin/payroll"))
}

#[utoipa::path(
    post,
    path = "/admin/payroll/{id}/update",
    tag = "Payroll",
    params(("id" = u64, Path, description = "Payroll id")),
    request_body(content = UpdatePayrollForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Figures replaced"),
        (status = 404, description = "Payroll not found or no longer pending")
    )
)]
pub async fn update_payroll(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    form: Result<web::Form<UpdatePayrollForm>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::UpdatePayroll)?;
    let form = submitted(form)?;

    payroll::update_figures(
        store.get_ref(),
        admin,
        path.into_inner(),
        form.hours_worked,
        form.hourly_rate,
        form.deductions,
        Utc::now(),
    )
    .await?;

    Ok(see_other("/admin/payroll"))
}

#[utoipa::path(
    post,
    path = "/admin/payroll/{id}/approve",
    tag = "Payroll",
    params(("id" = u64, Path, description = "Payroll id")),
    responses(
        (status = 303, description = "Payroll approved"),
        (status = 404, description = "Payroll not found or not pending")
    )
)]
pub async fn approve_payroll(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::ApprovePayroll)?;
    payroll::approve(store.get_ref(), admin, path.into_inner(), Utc::now()).await?;
    Ok(see_other("/admin/payroll"))
}

#[utoipa::path(
    post,
    path = "/admin/payroll/{id}/paid",
    tag = "Payroll",
    params(("id" = u64, Path, description = "Payroll id")),
    responses(
        (status = 303, description = "Payroll marked paid"),
        (status = 404, description = "Payroll not found or not approved")
    )
)]
pub async fn mark_payroll_paid(
    auth: AuthUser,
    gate: web::Data<AccessGate>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let admin = gate.authorize_admin(&auth, Operation::MarkPayrollPaid)?;
    payroll::mark_paid(store.get_ref(), admin, path.into_inner(), Utc::now()).await?;
    Ok(see_other("/admin/payroll"))
}
