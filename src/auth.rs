//! Request identity.
//!
//! Authentication happens upstream; the gateway forwards the verified user
//! id in the `x-user-id` header. Handlers take one of the extractors below
//! instead of reading any shared "current user" state.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::entities::users;
use crate::error::AppError;
use crate::models::ErrorResponse;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

type Rejection = (StatusCode, Json<ErrorResponse>);

fn header_user_id(parts: &Parts) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or(AppError::Unauthorized)
}

/// Authenticated identity, whether or not a profile row exists yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl FromRequestParts<AppState> for SessionId {
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        match header_user_id(parts)? {
            Some(id) => Ok(SessionId(id)),
            None => Err(AppError::Unauthorized.into()),
        }
    }
}

impl OptionalFromRequestParts<AppState> for SessionId {
    type Rejection = Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(header_user_id(parts)?.map(SessionId))
    }
}

/// Authenticated user with a profile row
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: users::Model,
    pub is_reviewer: bool,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionId(id) =
            <SessionId as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;

        let user = state
            .store
            .find_user(id)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            is_reviewer: state.reviewers.contains(&user.id),
            user,
        })
    }
}

/// Session whose id is one of the configured reviewers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reviewer(pub Uuid);

impl FromRequestParts<AppState> for Reviewer {
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionId(id) =
            <SessionId as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;

        if !state.reviewers.contains(&id) {
            return Err(AppError::Forbidden("reviewer role required".to_string()).into());
        }
        Ok(Reviewer(id))
    }
}
