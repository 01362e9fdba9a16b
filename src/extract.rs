use axum::{
    extract::{FromRequest, FromRequestParts, Json, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{
    error::AppError,
    validation::{Validate, ValidationErrors},
};

/// IdPath
///
/// `Path` whose rejection (e.g. `/posts/abc`) answers 406 Not Acceptable instead of axum's 400.
#[derive(Debug)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| IdPath(value))
            .map_err(|rejection| {
                AppError::NotAcceptable(format!(
                    "Validation failed (numeric string is expected): {}",
                    rejection.body_text()
                ))
            })
    }
}

/// IdQuery
///
/// `Query` counterpart of [`IdPath`], used for `?userId=`.
#[derive(Debug)]
pub struct IdQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for IdQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| IdQuery(value))
            .map_err(|rejection| {
                AppError::NotAcceptable(format!(
                    "Validation failed (numeric string is expected): {}",
                    rejection.body_text()
                ))
            })
    }
}

/// ValidatedJson
///
/// JSON body that must both deserialize and pass its `Validate` checks. Either failure is a
/// 400 carrying the field messages.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::body(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
