//! Validated JSON extractor.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use common::{ApiResponse, AppError};
use domain::error::field_errors;

/// JSON extractor that automatically validates the payload.
///
/// Rejections are answered with the regular failure envelope.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiResponse<()>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiResponse::failure(&AppError::bad_request(e.body_text())))?;

        value
            .validate()
            .map_err(|e| ApiResponse::failure(&AppError::Invalid(field_errors(&e))))?;

        Ok(ValidatedJson(value))
    }
}
