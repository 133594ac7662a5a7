//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` returned by every
//! handler. It implements `actix_web::error::ResponseError` so that errors
//! become HTTP responses with a JSON `{"error": ...}` body.
//!
//! Domain errors from the authentication core and the store convert into
//! `AppError` through `From`, which is where client-visible wording is chosen:
//! every token failure reads the same, and infrastructure details stay in the
//! server log.

use actix_web::{error::ResponseError, http::header, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::{AuthError, CredentialError};
use crate::store::StoreError;

/// Body of every 401. Deliberately identical for missing, malformed, expired
/// and orphaned tokens.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Body of a failed login. Does not say whether the email or the password was wrong.
pub const INCORRECT_LOGIN: &str = "Incorrect email or password";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// HTTP 401. Sent with a `WWW-Authenticate: Bearer` challenge.
    Unauthorized(String),
    /// HTTP 400.
    BadRequest(String),
    /// HTTP 404.
    NotFound(String),
    /// HTTP 500.
    InternalServerError(String),
    /// HTTP 500, for failures reported by the store.
    DatabaseError(String),
    /// HTTP 422, for payloads rejected by `validator`.
    ValidationError(String),
}

impl AppError {
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized(INVALID_CREDENTIALS.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({
                    "error": msg
                })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            AppError::DatabaseError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Invalid | AuthError::Expired | AuthError::UnknownSubject => {
                AppError::invalid_credentials()
            }
            AuthError::BadCredentials => AppError::BadRequest(INCORRECT_LOGIN.into()),
            AuthError::Signing(msg) => {
                log::error!("Token signing failed: {}", msg);
                AppError::InternalServerError("Failed to issue token".into())
            }
            // Never let an infrastructure failure look like a credential problem.
            AuthError::Store(store_error) => {
                log::error!("Identity lookup failed: {}", store_error);
                AppError::DatabaseError("Database error".into())
            }
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(error: CredentialError) -> AppError {
        match error {
            CredentialError::HashingFailed(msg) => AppError::BadRequest(msg),
        }
    }
}

/// Store details are logged, not returned.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            StoreError::Conflict(msg) => {
                log::debug!("Store conflict: {}", msg);
                AppError::BadRequest("Record already exists".into())
            }
            StoreError::Timeout => {
                log::error!("Store operation timed out");
                AppError::DatabaseError("Database unavailable".into())
            }
            StoreError::Database(msg) => {
                log::error!("Database error: {}", msg);
                AppError::DatabaseError("Database error".into())
            }
        }
    }
}
