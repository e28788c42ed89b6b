//! Calling-user extractor

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the calling user's name
pub const USER_HEADER: &str = "x-user";

/// User progress events are scoped to
pub const GUEST_USER: &str = "Guest";

/// The calling user, taken from `X-User` (defaults to `Guest`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|val| val.to_str().ok())
            .map(str::trim)
            .filter(|val| !val.is_empty())
            .unwrap_or(GUEST_USER);

        Ok(CurrentUser(user.to_string()))
    }
}
