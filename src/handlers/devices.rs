use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::api::{DeviceRegisterRequest, SuccessResponse};
use crate::security::auth::AuthUser;
use crate::utils::time::current_timestamp;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

/// List the current user's active device sessions
///
/// GET /users/devices
pub async fn list_devices_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    let devices = state.devices.active_sessions(actor.id);

    Ok((StatusCode::OK, Json(devices)).into_response())
}

/// Register (or reactivate) the calling device
///
/// POST /users/devices
///
/// Keeps the account within the two-device cap by evicting the session
/// with the oldest last_seen when needed.
pub async fn register_device_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<DeviceRegisterRequest>,
) -> Result<Response, ApiError> {
    if payload.device_fingerprint.trim().is_empty() {
        return Err(ApiError::Validation(
            "device_fingerprint must not be empty".to_string(),
        ));
    }

    let session = state.devices.register(
        actor.id,
        &payload.device_fingerprint,
        &payload.device_name,
        current_timestamp(),
    );

    info!(
        user_id = actor.id,
        device_id = session.id,
        device_name = %session.device_name,
        "Device registered"
    );

    Ok((StatusCode::OK, Json(session)).into_response())
}

/// Deactivate one of the current user's devices
///
/// DELETE /users/devices/{device_id}
pub async fn deactivate_device_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(device_id): Path<u32>,
) -> Result<Response, ApiError> {
    if !state.devices.deactivate(actor.id, device_id) {
        return Err(ApiError::not_found("Device"));
    }

    info!(user_id = actor.id, device_id = device_id, "Device deactivated");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Device deactivated successfully".to_string(),
        }),
    )
        .into_response())
}
