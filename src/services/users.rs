use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::entities::users;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::user::{CreateUserRequest, UpdateProfileRequest, VerificationStatus};
use crate::repositories::{NewUser, ProfileUpdate, Store};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates the profile row for an identity the gateway already authenticated
pub async fn create_profile(
    store: &dyn Store,
    id: Uuid,
    request: CreateUserRequest,
) -> AppResult<users::Model> {
    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::new("email", "is not a valid email address").into());
    }

    let user = store
        .create_user(NewUser {
            id,
            email,
            full_name: non_blank(request.full_name),
            role: request.role,
            organization_name: non_blank(request.organization_name),
            phone: non_blank(request.phone),
        })
        .await?;

    tracing::info!("Created {} profile {}", user.role, user.id);
    Ok(user)
}

pub async fn get_profile(store: &dyn Store, id: Uuid) -> AppResult<users::Model> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))
}

pub async fn update_profile(
    store: &dyn Store,
    id: Uuid,
    request: UpdateProfileRequest,
) -> AppResult<users::Model> {
    if let Some(name) = &request.full_name {
        if name.trim().is_empty() {
            return Err(ValidationError::new("full_name", "must not be blank").into());
        }
    }

    Ok(store
        .update_profile(
            id,
            ProfileUpdate {
                full_name: non_blank(request.full_name),
                organization_name: non_blank(request.organization_name),
                phone: non_blank(request.phone),
                address: request.address,
                verification_document_url: non_blank(request.verification_document_url),
            },
        )
        .await?)
}

pub async fn set_verification_status(
    store: &dyn Store,
    id: Uuid,
    status: VerificationStatus,
) -> AppResult<users::Model> {
    let user = store.set_verification_status(id, status).await?;
    tracing::info!("User {} verification set to {}", id, status);
    Ok(user)
}
