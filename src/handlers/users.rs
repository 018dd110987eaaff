use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::api::{ActivateRequest, ActivateResponse, MeResponse, PageQuery, SuccessResponse};
use crate::models::user::UserUpdate;
use crate::security::auth::AuthUser;
use crate::security::{password, permissions};
use crate::stores::user_store::UserPatch;
use crate::utils::time::current_timestamp;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

/// The current account with its subscription window
///
/// GET /users/me
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    let now = current_timestamp();

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            access_valid: state.keys.is_valid(actor.id, now),
            access_valid_until: state.keys.valid_until(actor.id),
            user: actor,
        }),
    )
        .into_response())
}

/// List accounts (manager or admin)
///
/// GET /users?skip=<n>&limit=<n>
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    let users = state.users.list(page.skip, page.limit);

    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Fetch one profile: self, or manager tier
///
/// GET /users/{user_id}
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
) -> Result<Response, ApiError> {
    permissions::ensure_read_user(&actor, user_id)?;

    let user = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok((StatusCode::OK, Json(user)).into_response())
}

/// Generic profile update
///
/// PUT /users/{user_id}
///
/// The permission engine decides which fields the actor may touch; the
/// owner record can only be edited by itself.
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
    Json(update): Json<UserUpdate>,
) -> Result<Response, ApiError> {
    let target = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    permissions::ensure_update_user(&actor, &target, &update)?;

    if let Some(email) = &update.email {
        if !email.contains('@') {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }
    }
    if let Some(year) = update.year_of_study {
        if !(1..=3).contains(&year) {
            return Err(ApiError::Validation("year_of_study must be 1-3".to_string()));
        }
    }

    let password_hash = match &update.password {
        Some(plain) => {
            if plain.len() < 8 {
                return Err(ApiError::Validation(
                    "Password must be at least 8 characters".to_string(),
                ));
            }
            Some(password::hash_password(plain)?)
        }
        None => None,
    };

    let patch = UserPatch {
        email: update.email.clone(),
        username: update.username.clone(),
        password_hash,
        role: update.role,
        is_paid: update.is_paid,
        year_of_study: update.year_of_study,
        speciality: update.speciality.clone(),
    };

    let user = state
        .users
        .update(user_id, patch, current_timestamp())
        .map_err(|e| ApiError::Conflict(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("User"))?;

    info!(
        actor_id = actor.id,
        user_id = user.id,
        role_changed = update.role.is_some(),
        "User profile updated"
    );

    Ok((StatusCode::OK, Json(user)).into_response())
}

/// Generic delete path: self-delete only
///
/// DELETE /users/{user_id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
) -> Result<Response, ApiError> {
    let target = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    permissions::ensure_self_delete(&actor, &target)?;

    if !state.users.delete(user_id) {
        return Err(ApiError::not_found("User"));
    }

    info!(user_id = user_id, "User deleted own account");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "User deleted successfully".to_string(),
        }),
    )
        .into_response())
}

/// Redeem an activation key for the current account
///
/// POST /users/activate
///
/// The unused->used flip inside the key store is the commit point;
/// setting the payment flag immediately after completes the unit. A key
/// can never be spent twice.
pub async fn activate_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<ActivateRequest>,
) -> Result<Response, ApiError> {
    let now = current_timestamp();

    let key = state.keys.redeem(&payload.key, actor.id, now).map_err(|e| {
        warn!(user_id = actor.id, "Activation failed");
        ApiError::Conflict(e.to_string())
    })?;

    state.users.set_paid(actor.id, true, now);

    let expires_at = key.expires_at.expect("redeemed key always has an expiry");

    info!(
        user_id = actor.id,
        key_id = key.id,
        expires_at = expires_at,
        "Account activated"
    );

    Ok((
        StatusCode::OK,
        Json(ActivateResponse {
            message: "Account activated successfully".to_string(),
            user_id: actor.id,
            is_paid: true,
            expires_at,
        }),
    )
        .into_response())
}
