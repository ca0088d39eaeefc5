//! Request extractors for the authenticated user.
//!
//! The auth middleware resolves the bearer token and places the user model
//! in request extensions; these extractors read it back out.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use zapis_common::AppError;
use zapis_db::entities::user;

/// The authenticated user. Rejects with 401 when the request is anonymous.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}

/// The authenticated user, if any. Never rejects; guarded handlers decide
/// what an anonymous viewer gets.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}
