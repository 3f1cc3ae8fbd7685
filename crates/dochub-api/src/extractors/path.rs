//! Typed path parameters with envelope-shaped rejections.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use dochub_core::error::AppError;

use crate::error::ApiError;

/// Path parameters; malformed IDs fail with `VALIDATION_ERROR`.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|e| {
                ApiError(AppError::validation(format!(
                    "Invalid path parameter: {}",
                    e.body_text()
                )))
            })
    }
}
