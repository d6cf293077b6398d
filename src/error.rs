use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Phone number is not verified")]
    NotVerified,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A request for this form is already in flight")]
    Busy,

    #[error("Open form limit reached")]
    TooManyForms,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::TransportError(err.to_string())
    }
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ProviderError(_) => "PROVIDER_ERROR",
            AppError::TransportError(_) => "TRANSPORT_ERROR",
            AppError::NotVerified => "NOT_VERIFIED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Busy => "REQUEST_IN_FLIGHT",
            AppError::TooManyForms => "TOO_MANY_FORMS",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 面向用户展示的单行消息
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigurationError(msg)
            | AppError::ValidationError(msg)
            | AppError::ProviderError(msg)
            | AppError::TransportError(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::NotVerified => "Please verify your phone number first".to_string(),
            AppError::Busy => "A request is already in progress, please wait".to_string(),
            AppError::TooManyForms => "Too many open forms, please try again later".to_string(),
            AppError::InternalError(_) => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ConfigurationError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ProviderError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TransportError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotVerified => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::TooManyForms => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ValidationError(_)
            | AppError::NotVerified
            | AppError::NotFound(_)
            | AppError::Busy
            | AppError::TooManyForms => log::warn!("{self}"),
            _ => log::error!("{self}"),
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.user_message()
            }
        }))
    }
}
