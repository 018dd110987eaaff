use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::api::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, SuccessResponse, TokenResponse,
};
use crate::models::user::Role;
use crate::security::{auth, password};
use crate::stores::user_store::{NewUser, UserPatch};
use crate::utils::time::current_timestamp;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Register a student account
///
/// POST /auth/register
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if payload.username.trim().is_empty() {
        return Err(ApiError::Validation("Username must not be empty".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if let Some(year) = payload.year_of_study {
        if !(1..=3).contains(&year) {
            return Err(ApiError::Validation("year_of_study must be 1-3".to_string()));
        }
    }

    let password_hash = password::hash_password(&payload.password)?;

    // Registration only ever creates students; roles are granted later by
    // an admin
    let user = state
        .users
        .create(
            NewUser {
                email: payload.email,
                username: payload.username,
                password_hash,
                role: Role::Student,
                is_paid: false,
                year_of_study: payload.year_of_study,
                speciality: payload.speciality,
            },
            current_timestamp(),
        )
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::OK, Json(user)).into_response())
}

/// Exchange credentials for a bearer token
///
/// POST /auth/login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    // One shared message for unknown email and wrong password, so accounts
    // cannot be enumerated
    let invalid = || ApiError::Auth("Invalid email or password".to_string());

    let user = state.users.find_by_email(&payload.email).ok_or_else(|| {
        warn!("Login attempt for unknown email");
        invalid()
    })?;

    if !password::verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(invalid());
    }

    let token = auth::issue_token(&state, user.id, current_timestamp());

    info!(user_id = user.id, "User logged in");

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    )
        .into_response())
}

/// Change a password by proving knowledge of the current one
///
/// POST /auth/change-password
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    let invalid = || ApiError::Auth("Invalid email or current password".to_string());

    if payload.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let user = state.users.find_by_email(&payload.email).ok_or_else(invalid)?;

    if !password::verify_password(&payload.current_password, &user.password_hash) {
        warn!(user_id = user.id, "Password change with wrong current password");
        return Err(invalid());
    }

    let password_hash = password::hash_password(&payload.new_password)?;
    state
        .users
        .update(
            user.id,
            UserPatch {
                password_hash: Some(password_hash),
                ..Default::default()
            },
            current_timestamp(),
        )
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    info!(user_id = user.id, "Password changed");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Password changed successfully".to_string(),
        }),
    )
        .into_response())
}
