use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use ruralcart_common::validation::{FieldError, Validate};

use crate::error::ApiError;

/// JSON body extractor that decodes strictly and then runs [`Validate`].
///
/// Malformed JSON, decode failures and rule violations all reject with
/// [`ApiError::Validation`], before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(vec![FieldError::new("body", e.body_text())]))?;
        decode(&bytes).map(ValidJson)
    }
}

fn decode<T: DeserializeOwned + Validate>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: T = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::Validation(vec![FieldError::from_decode(&e)]))?;
    let errors = value.validate();
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ApiError::Validation(errors))
    }
}
