use actix_web::cookie::Cookie;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

use crate::auth::{auth::AuthUser, jwt::verify_token};
use crate::config::Config;
use crate::error::AppError;
use crate::utils::revoked_sessions::RevokedSessions;

pub const SESSION_COOKIE: &str = "hr_session";

/// Session cookie first, `Authorization: Bearer` as a fallback for API clients.
pub fn session_token(cookie: Option<Cookie<'static>>, headers: &HeaderMap) -> Option<String> {
    cookie.map(|c| c.value().to_string()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    })
}

/// Resolves the session into an [`AuthUser`]; anything else is sent to the login page.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let revoked = req
        .app_data::<Data<RevokedSessions>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Session store missing"))?;

    let Some(token) = session_token(req.cookie(SESSION_COOKIE), req.headers()) else {
        debug!(path = %req.path(), "No session, redirecting to login");
        return Ok(req.into_response(AppError::Unauthenticated.error_response()));
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Invalid or expired session");
            return Ok(req.into_response(AppError::Unauthenticated.error_response()));
        }
    };

    if revoked.is_revoked(&claims.jti) {
        debug!(user_id = claims.user_id, "Session was logged out");
        return Ok(req.into_response(AppError::Unauthenticated.error_response()));
    }

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    #[test]
    fn cookie_wins_over_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        let cookie = Cookie::new(SESSION_COOKIE, "from-cookie");
        assert_eq!(session_token(Some(cookie), &headers).as_deref(), Some("from-cookie"));
        assert_eq!(session_token(None, &headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn non_bearer_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(session_token(None, &headers), None);
    }
}
