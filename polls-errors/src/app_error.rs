use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("You have already voted on this question.")]
    AlreadyVoted,

    #[error("You didn't select a choice.")]
    InvalidChoice,

    #[error("Not found")]
    NotFound,

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Too many attempts, retry in {0} seconds")]
    RateLimited(u64),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            Self::AlreadyVoted => "You have already voted on this question.".to_string(),
            Self::InvalidChoice => "You didn't select a choice.".to_string(),
            Self::NotFound => "The page you requested is not available.".to_string(),
            Self::Validation(_) => "Please correct the errors below.".to_string(),
            Self::InvalidCredentials => {
                "Please enter a correct username and password.".to_string()
            }
            Self::Unauthorized => "Please log in to continue.".to_string(),
            Self::Forbidden => "You do not have permission to do that.".to_string(),
            Self::RateLimited(secs) => {
                format!("Too many attempts. Try again in {} seconds.", secs)
            }
            Self::MalformedPayload(_) => "The submitted form could not be read.".to_string(),
            Self::Configuration(_) | Self::Database(_) | Self::Internal(_) => {
                "Something went wrong on our side. Try again later.".to_string()
            }
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

#[cfg(feature = "db")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound,
            other => AppError::Database(other.to_string()),
        }
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::{AppError, FieldErrors};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<FieldErrors>,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::AlreadyVoted => StatusCode::CONFLICT,
                AppError::InvalidChoice => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AppError::Unauthorized => StatusCode::UNAUTHORIZED,
                AppError::Forbidden => StatusCode::FORBIDDEN,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
                AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                tracing::error!("Request failed: {}", self);
            }
            let body = ErrorResponse {
                message: self.user_message(),
                fields: self.field_errors().cloned(),
            };
            (status, Json(body)).into_response()
        }
    }
}
