use crate::{
    api::{dashboard, payroll, shift, time_off},
    auth::{handlers, middleware::session_middleware},
    error::see_other,
    state::AppState,
};
use actix_web::{HttpResponse, middleware::from_fn, web};

pub async fn index() -> HttpResponse {
    see_other("/auth/login")
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Page not found")
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    state.register(cfg);
    let limits = &state.limits;

    cfg.service(web::resource("/").route(web::get().to(index)));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limits.login.clone())
                    .route(web::get().to(handlers::login_form))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/signup")
                    .wrap(limits.signup.clone())
                    .route(web::get().to(handlers::signup_form))
                    .route(web::post().to(handlers::signup)),
            )
            .service(web::resource("/logout").route(web::get().to(handlers::logout))),
    );

    // Employee routes
    cfg.service(
        web::scope("/employee")
            .wrap(from_fn(session_middleware)) // authentication
            .wrap(limits.protected.clone()) // rate limiting
            .route("/dashboard", web::get().to(dashboard::employee_dashboard))
            .route("/profile", web::get().to(dashboard::employee_profile))
            .route("/shifts", web::get().to(shift::employee_shifts))
            .route("/shifts/create-request", web::post().to(shift::request_shift))
            .route("/shifts/{id}/delete", web::post().to(shift::withdraw_request))
            .route("/shifts/{id}/take", web::post().to(shift::take_shift))
            .route("/timeoff", web::get().to(time_off::employee_time_off))
            .route("/timeoff/request", web::post().to(time_off::request_time_off))
            .route("/timeoff/{id}/cancel", web::post().to(time_off::cancel_time_off))
            .route("/payroll", web::get().to(payroll::employee_payroll)),
    );

    // Admin routes
    cfg.service(
        web::scope("/admin")
            .wrap(from_fn(session_middleware))
            .wrap(limits.protected.clone())
            .route("/dashboard", web::get().to(dashboard::admin_dashboard))
            .route("/profile", web::get().to(dashboard::admin_profile))
            .route("/shifts", web::get().to(shift::admin_shifts))
            .route("/shifts/create", web::post().to(shift::post_shift))
            .route("/shifts/{id}/approve", web::post().to(shift::approve_request))
            .route("/shifts/{id}/deny", web::post().to(shift::deny_request))
            .route("/shifts/{id}/delete", web::post().to(shift::delete_shift))
            .route("/timeoff", web::get().to(time_off::admin_time_off))
            .route("/timeoff/{id}/approve", web::post().to(time_off::approve_time_off))
            .route("/timeoff/{id}/deny", web::post().to(time_off::deny_time_off))
            .route("/payroll", web::get().to(payroll::admin_payroll))
            .route("/payroll/create", web::post().to(payroll::create_payroll))
            .route("/payroll/{id}/update", web::post().to(payroll::update_payroll))
            .route("/payroll/{id}/approve", web::post().to(payroll::approve_payroll))
            .route("/payroll/{id}/paid", web::post().to(payroll::mark_payroll_paid)),
    );
}

// LOGIN
//  └─ hr_session cookie (JWT, 7 days)

// EMPLOYEE / ADMIN REQUEST
//  └─ cookie or Authorization: Bearer <token>

// LOGOUT
//  └─ jti revoked until the token would have expired
