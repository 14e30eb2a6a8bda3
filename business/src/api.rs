//! REST client helpers for the `/users`, `/roles` and `/permissions`
//! collection resources.
//!
//! These functions perform network IO and are meant to be called from
//! commands; callers map results into compute updates. Any transport error or
//! non-2xx status is treated uniformly as "operation failed" with no finer
//! taxonomy extracted from the response body.

use thiserror::Error;

use crate::http::Client;
use crate::records::{Permission, PermissionDraft, Role, RoleDraft, UserDraft, UserRecord};

/// Minimal error wrapper for API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn status(status: u16) -> Self {
        Self::new(format!("API returned status: {status}"))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// GET `/users`
pub async fn list_users(api_base_url: &str) -> ApiResult<Vec<UserRecord>> {
    let url = format!("{api_base_url}/users");

    let response = Client::get(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse user list: {e}")))
}

/// POST `/users` with a draft body (no id); the remote resource assigns one.
pub async fn create_user(api_base_url: &str, draft: &UserDraft) -> ApiResult<UserRecord> {
    let url = format!("{api_base_url}/users");

    let request = Client::post(&url)
        .json(draft)
        .map_err(|e| ApiError::new(format!("failed to serialize user draft: {e}")))?;

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse created user: {e}")))
}

/// PUT `/users/{id}` replacing the full record.
pub async fn update_user(api_base_url: &str, id: u64, draft: &UserDraft) -> ApiResult<UserRecord> {
    let url = format!("{api_base_url}/users/{id}");

    let request = Client::put(&url)
        .json(draft)
        .map_err(|e| ApiError::new(format!("failed to serialize user draft: {e}")))?;

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse updated user: {e}")))
}

/// DELETE `/users/{id}`. The response body is not used.
pub async fn delete_user(api_base_url: &str, id: u64) -> ApiResult<()> {
    let url = format!("{api_base_url}/users/{id}");

    let response = Client::delete(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    Ok(())
}

/// GET `/roles`
pub async fn list_roles(api_base_url: &str) -> ApiResult<Vec<Role>> {
    let url = format!("{api_base_url}/roles");

    let response = Client::get(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse role list: {e}")))
}

/// POST `/roles`
pub async fn create_role(api_base_url: &str, draft: &RoleDraft) -> ApiResult<Role> {
    let url = format!("{api_base_url}/roles");

    let request = Client::post(&url)
        .json(draft)
        .map_err(|e| ApiError::new(format!("failed to serialize role draft: {e}")))?;

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse created role: {e}")))
}

/// PUT `/roles/{id}` replacing the full record. Permission assignment is this
/// same call with the new permission set in the draft.
pub async fn update_role(api_base_url: &str, id: u64, draft: &RoleDraft) -> ApiResult<Role> {
    let url = format!("{api_base_url}/roles/{id}");

    let request = Client::put(&url)
        .json(draft)
        .map_err(|e| ApiError::new(format!("failed to serialize role draft: {e}")))?;

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse updated role: {e}")))
}

/// DELETE `/roles/{id}`
pub async fn delete_role(api_base_url: &str, id: u64) -> ApiResult<()> {
    let url = format!("{api_base_url}/roles/{id}");

    let response = Client::delete(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    Ok(())
}

/// GET `/permissions`
pub async fn list_permissions(api_base_url: &str) -> ApiResult<Vec<Permission>> {
    let url = format!("{api_base_url}/permissions");

    let response = Client::get(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse permission list: {e}")))
}

/// POST `/permissions`
pub async fn create_permission(
    api_base_url: &str,
    draft: &PermissionDraft,
) -> ApiResult<Permission> {
    let url = format!("{api_base_url}/permissions");

    let request = Client::post(&url)
        .json(draft)
        .map_err(|e| ApiError::new(format!("failed to serialize permission draft: {e}")))?;

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    response
        .json()
        .map_err(|e| ApiError::new(format!("failed to parse created permission: {e}")))
}

/// DELETE `/permissions/{id}`
pub async fn delete_permission(api_base_url: &str, id: u64) -> ApiResult<()> {
    let url = format!("{api_base_url}/permissions/{id}");

    let response = Client::delete(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(e.to_string()))?;

    if !response.is_success() {
        return Err(ApiError::status(response.status));
    }

    Ok(())
}
