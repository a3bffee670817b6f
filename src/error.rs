use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header, web};
use derive_more::Display;
use tracing::error;

use crate::store::StoreError;

/// Handler-facing error. Every variant renders as a plain-text body;
/// an unauthenticated caller is sent back to the login page instead.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Authentication required")]
    Unauthenticated,

    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "Something went wrong!")]
    Internal,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated => see_other("/auth/login"),
            _ => HttpResponse::build(self.status_code())
                .content_type("text/plain; charset=utf-8")
                .body(self.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            other => {
                error!(error = %other, "Persistence failure");
                AppError::Internal
            }
        }
    }
}

/// POST-redirect-GET response used by every successful mutation.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Body of a form handler, read only after the caller passed the gate.
pub fn submitted<T>(form: Result<web::Form<T>, actix_web::Error>) -> Result<T, AppError> {
    form.map(web::Form::into_inner).map_err(|e| AppError::Validation(e.to_string()))
}
