//! Request extractors that reject into the shared error envelope.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::dto::CheckInQuery;
use crate::error::AppError;
use crate::models::check_in::DateRange;

/// JSON body that has passed its `validator` rules.
///
/// A body that fails to parse (wrong types, missing required fields) is
/// reported the same way as a rule violation: 400 with a message.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// `fromDate` / `toDate` query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFilter(pub DateRange);

#[async_trait]
impl<S> FromRequestParts<S> for DateFilter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<CheckInQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(Self(query.into()))
    }
}
