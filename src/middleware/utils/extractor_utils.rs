use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{
    async_trait,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Form, Json, RequestExt,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::error::{AppError, CtxError};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::Pagination;

pub(crate) fn error_response<E: Into<AppError>>(err: E) -> Response {
    let error: AppError = err.into();
    CtxError::from_app(error).into_response()
}

fn bad_request(description: String) -> Response {
    error_response(AppError::Generic { description })
}

#[derive(Debug)]
pub struct JsonOrFormValidated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrFormValidated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    type Rejection = Response;

    async fn from_request(req: Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let payload: T = if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(payload) = req
                .extract()
                .await
                .map_err(|e: FormRejection| bad_request(e.body_text()))?;
            payload
        } else {
            let Json(payload) = req
                .extract()
                .await
                .map_err(|e: JsonRejection| bad_request(e.body_text()))?;
            payload
        };

        payload
            .validate()
            .map_err(error_response)?;
        Ok(Self(payload))
    }
}

/// JSON body that may arrive as `{"encrypted": "<base64>"}` ciphertext of
/// the real body, decrypted with the server's `RequestCipher`.
#[derive(Debug)]
pub struct MaybeEncryptedJson<T>(pub T);

#[derive(Deserialize)]
struct EncryptedBody {
    encrypted: String,
}

#[async_trait]
impl<T> FromRequest<Arc<CtxState>> for MaybeEncryptedJson<T>
where
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    type Rejection = Response;

    async fn from_request(req: Request<Body>, state: &Arc<CtxState>) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;

        let payload: T = match serde_json::from_value::<EncryptedBody>(body.clone()) {
            Ok(EncryptedBody { encrypted }) => state
                .cipher
                .decrypt_json(&encrypted)
                .map_err(error_response)?,
            Err(_) => serde_json::from_value(body)
                .map_err(error_response)?,
        };

        payload
            .validate()
            .map_err(error_response)?;
        Ok(Self(payload))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub user_id: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Result<Pagination, AppError> {
        Pagination::new(self.page, self.per_page)
    }
}

/// Query string extractor that answers malformed input with the error envelope.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(params) = axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| bad_request(e.body_text()))?;
        Ok(Self(params))
    }
}
