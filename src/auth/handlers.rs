use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::{generate_session_token, verify_token},
        middleware::{SESSION_COOKIE, session_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::{AppError, see_other},
    model::{
        role::Role,
        user::{NewUser, User, normalize_email},
    },
    models::{LoginForm, SignupForm},
    store::Store,
    utils::{email_registry::EmailRegistry, revoked_sessions::RevokedSessions},
};

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::seconds(config.session_ttl as i64))
        .finish()
}

/// Issues a session cookie and sends the user to their dashboard.
fn start_session(user: &User, config: &Config) -> Result<HttpResponse, AppError> {
    let (token, claims) = generate_session_token(user, &config.jwt_secret, config.session_ttl)
        .map_err(|e| {
            error!(error = %e, "Failed to sign session token");
            AppError::Internal
        })?;

    debug!(user_id = user.id, jti = %claims.jti, "Session issued");

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, user.role.dashboard()))
        .cookie(session_cookie(token, config))
        .finish())
}

#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "Auth",
    responses((status = 200, description = "Login form description"))
)]
pub async fn login_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "title": "Login",
        "action": "/auth/login",
        "method": "POST",
        "fields": ["email", "password"]
    }))
}

#[utoipa::path(
    get,
    path = "/auth/signup",
    tag = "Auth",
    responses((status = 200, description = "Signup form description"))
)]
pub async fn signup_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "title": "Sign Up",
        "action": "/auth/signup",
        "method": "POST",
        "fields": ["name", "email", "password", "phone", "hire_date"]
    }))
}

/// Bad email and bad password look the same to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Dashboard on success, back to the login page otherwise"),
        (status = 429, description = "Too many attempts")
    )
)]
#[instrument(name = "auth_login", skip(form, store, config), fields(email = %form.email))]
pub async fn login(
    form: web::Form<LoginForm>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let email = normalize_email(&form.email);
    if email.is_empty() || form.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Ok(see_other("/auth/login"));
    }

    let Some(user) = store.find_user_by_email(&email).await? else {
        info!("Invalid credentials: user not found");
        return Ok(see_other("/auth/login"));
    };

    if let Err(e) = verify_password(&form.password, &user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Ok(see_other("/auth/login"));
    }

    info!(user_id = user.id, role = %user.role, "Login successful");
    start_session(&user, &config)
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, redirected to the dashboard"),
        (status = 400, description = "Missing name, email or password"),
        (status = 409, description = "Email already registered")
    )
)]
#[instrument(
    name = "auth_signup",
    skip(form, store, config, registry),
    fields(email = %form.email)
)]
pub async fn signup(
    form: web::Form<SignupForm>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    registry: web::Data<EmailRegistry>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let name = form.name.trim().to_string();
    let email = normalize_email(&form.email);

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".into(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    if !registry.is_available(&email, store.get_ref()).await? {
        info!("Signup rejected: email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&form.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal
    })?;

    let now = Utc::now();
    let user = store
        .insert_user(NewUser {
            name,
            role: Role::for_signup(&email, &config.admin_emails),
            email,
            password_hash,
            phone: form
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            hire_date: form.hire_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        })
        .await?;

    registry.record(&user.email).await;

    info!(user_id = user.id, role = %user.role, "Account created");
    start_session(&user, &config)
}

#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 303, description = "Session ended, redirected to /"))
)]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    revoked: web::Data<RevokedSessions>,
) -> HttpResponse {
    if let Some(token) = session_token(req.cookie(SESSION_COOKIE), req.headers()) {
        // an expired or forged token has nothing left to revoke
        if let Ok(claims) = verify_token(&token, &config.jwt_secret) {
            revoked.revoke(&claims.jti).await;
            info!(user_id = claims.user_id, "Logged out");
        }
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();

    HttpResponse::SeeOther()
        .insert_header((LOCATION, "/"))
        .cookie(removal)
        .finish()
}
