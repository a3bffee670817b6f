use crate::api::dashboard::{AdminDashboard, EmployeeDashboard};
use crate::api::payroll::{CreatePayrollForm, UpdatePayrollForm};
use crate::api::shift::{PostShiftForm, ShiftRequestForm};
use crate::api::time_off::{ReviewForm, TimeOffForm};
use crate::lifecycle::payroll::{AdminPayroll, EmployeePayroll};
use crate::lifecycle::shift::{AdminShifts, EmployeeShifts, StatusCounts};
use crate::lifecycle::time_off::{AdminTimeOff, EmployeeTimeOff};
use crate::model::payroll::{Payroll, PayrollFigures, PayrollStatus};
use crate::model::role::Role;
use crate::model::shift::{ShiftStatus, ShiftType, ShiftView};
use crate::model::time_off::{TimeOffRequest, TimeOffStatus};
use crate::model::user::UserProfile;
use crate::models::{LoginForm, SignupForm};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftboard API",
        version = "1.0.0",
        description = r#"
## Shift scheduling and HR administration

Employees request shifts, claim open shifts, request time off and view their
payroll. Admins post open shifts, review requests and manage payroll.

### Security
All `/employee` and `/admin` routes need a session, carried in the
`hr_session` cookie set by `/auth/login` and `/auth/signup`
(an `Authorization: Bearer` header is accepted too).

### Responses
- Views return JSON.
- Mutations take form bodies and answer `303 See Other` to the originating view.
- Errors are plain text.
"#,
    ),
    paths(
        crate::auth::handlers::login_form,
        crate::auth::handlers::login,
        crate::auth::handlers::signup_form,
        crate::auth::handlers::signup,
        crate::auth::handlers::logout,

        crate::api::dashboard::employee_dashboard,
        crate::api::dashboard::admin_dashboard,
        crate::api::dashboard::employee_profile,
        crate::api::dashboard::admin_profile,

        crate::api::shift::employee_shifts,
        crate::api::shift::request_shift,
        crate::api::shift::withdraw_request,
        crate::api::shift::take_shift,
        crate::api::shift::admin_shifts,
        crate::api::shift::post_shift,
        crate::api::shift::approve_request,
        crate::api::shift::deny_request,
        crate::api::shift::delete_shift,

        crate::api::time_off::employee_time_off,
        crate::api::time_off::request_time_off,
        crate::api::time_off::cancel_time_off,
        crate::api::time_off::admin_time_off,
        crate::api::time_off::approve_time_off,
        crate::api::time_off::deny_time_off,

        crate::api::payroll::employee_payroll,
        crate::api::payroll::admin_payroll,
        crate::api::payroll::create_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::approve_payroll,
        crate::api::payroll::mark_payroll_paid
    ),
    components(
        schemas(
            LoginForm,
            SignupForm,
            Role,
            UserProfile,
            EmployeeDashboard,
            AdminDashboard,
            ShiftType,
            ShiftStatus,
            ShiftView,
            StatusCounts,
            EmployeeShifts,
            AdminShifts,
            PostShiftForm,
            ShiftRequestForm,
            TimeOffStatus,
            TimeOffRequest,
            EmployeeTimeOff,
            AdminTimeOff,
            TimeOffForm,
            ReviewForm,
            PayrollStatus,
            PayrollFigures,
            Payroll,
            EmployeePayroll,
            AdminPayroll,
            CreatePayrollForm,
            UpdatePayrollForm
        )
    ),
    tags(
        (name = "Auth", description = "Login, signup and logout"),
        (name = "Dashboard", description = "Dashboards and profile"),
        (name = "Shifts", description = "Shift requests and open shifts"),
        (name = "Time Off", description = "Time-off requests"),
        (name = "Payroll", description = "Payroll records"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/login"));
        assert!(paths.contains_key("/employee/shifts/{id}/take"));
        assert!(paths.contains_key("/admin/payroll/{id}/paid"));
        assert_eq!(paths.len(), 28);
    }
}
