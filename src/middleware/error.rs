use std::fmt;

use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::middleware::ctx::Ctx;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    AuthenticationFail,
    EntityFailIdNotFound { ident: String },
    EmailAlreadyUsed,
    NotEnoughPoints,
    RewardUnavailable,
    AuthFailNoJwtCookie,
    AuthFailJwtInvalid { source: String },
    RequestDecrypt { source: String },
    Serde { source: String },
    SurrealDb { source: String },
}

/// Error carrying the request id that is reported back to the client.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error raised before a response is composed.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

impl CtxError {
    pub fn from<T: Into<AppError>>(ctx: &Ctx) -> impl FnOnce(T) -> CtxError + '_ {
        |err| CtxError {
            req_id: ctx.req_id(),
            error: err.into(),
        }
    }
}

impl CtxError {
    /// Error raised outside a handler, with a fresh request id.
    pub fn from_app(error: AppError) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error,
        }
    }
}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError::from_app(value)
    }
}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        AppError::from(value).into()
    }
}

impl From<validator::ValidationErrors> for CtxError {
    fn from(value: validator::ValidationErrors) -> Self {
        AppError::from(value).into()
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::AuthenticationFail => write!(f, "Invalid email or password"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::EmailAlreadyUsed => write!(f, "The email is already registered"),
            Self::NotEnoughPoints => write!(f, "Not enough points"),
            Self::RewardUnavailable => write!(f, "The reward is not available"),
            Self::AuthFailNoJwtCookie => write!(f, "You are not logged in"),
            Self::AuthFailJwtInvalid { .. } => write!(f, "The provided JWT token is not valid"),
            Self::RequestDecrypt { .. } => write!(f, "Could not decrypt request payload"),
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Generic { .. }
            | AppError::EmailAlreadyUsed
            | AppError::NotEnoughPoints
            | AppError::RewardUnavailable
            | AppError::RequestDecrypt { .. }
            | AppError::Serde { .. }
            | AppError::SurrealDb { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthenticationFail
            | AppError::AuthFailNoJwtCookie
            | AppError::AuthFailJwtInvalid { .. } => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Error envelope, same shape as the success envelope plus the request id.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub data: Option<()>,
    pub message: String,
    pub success: bool,
    pub req_id: String,
}

impl ErrorResponseBody {
    pub fn new(message: String, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            data: None,
            message,
            success: false,
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.error.status_code();
        match &self.error {
            AppError::SurrealDb { source } => {
                error!(req_id = %self.req_id, "->> db error: {source}")
            }
            err => warn!(req_id = %self.req_id, status = %status_code, "->> {err:?}"),
        }
        let body = ErrorResponseBody::new(self.error.to_string(), Some(self.req_id.to_string()));
        let mut response = (status_code, axum::Json(body)).into_response();
        response.extensions_mut().insert(self.error);
        response
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<CtxError> for AppError {
    fn from(value: CtxError) -> Self {
        value.error
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::AuthFailJwtInvalid {
            source: value.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Generic {
            description: value.to_string(),
        }
    }
}
