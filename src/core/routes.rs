// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/auth/register", post(crate::handlers::auth::register_handler))
        .route("/auth/login", post(crate::handlers::auth::login_handler))
        .route("/auth/change-password", post(crate::handlers::auth::change_password_handler))

        // Account endpoints (bearer token)
        .route("/users", get(crate::handlers::users::list_users_handler))
        .route("/users/me", get(crate::handlers::users::me_handler))
        .route("/users/activate", post(crate::handlers::users::activate_handler))
        .route("/users/devices", get(crate::handlers::devices::list_devices_handler))
        .route("/users/devices", post(crate::handlers::devices::register_device_handler))
        .route("/users/devices/{device_id}", delete(crate::handlers::devices::deactivate_device_handler))
        .route("/users/{user_id}", get(crate::handlers::users::get_user_handler))
        .route("/users/{user_id}", put(crate::handlers::users::update_user_handler))
        .route("/users/{user_id}", delete(crate::handlers::users::delete_user_handler))

        // Question bank (paid access; authoring needs manager tier)
        .route("/questions", get(crate::handlers::questions::list_questions_handler))
        .route("/questions", post(crate::handlers::questions::create_question_handler))
        .route("/questions/import", post(crate::handlers::questions::import_questions_handler))
        .route("/questions/meta/years", get(crate::handlers::questions::list_years_handler))
        .route("/questions/meta/modules", get(crate::handlers::questions::list_modules_handler))
        .route("/questions/{question_id}", get(crate::handlers::questions::get_question_handler))
        .route("/questions/{question_id}", put(crate::handlers::questions::update_question_handler))
        .route("/questions/{question_id}", delete(crate::handlers::questions::delete_question_handler))

        // Admin endpoints
        .route("/admin/dashboard", get(crate::handlers::admin::dashboard_handler))
        .route("/admin/users", get(crate::handlers::admin::list_users_handler))
        .route("/admin/users/{user_id}/details", get(crate::handlers::admin::user_details_handler))
        .route("/admin/users/{user_id}/payment", put(crate::handlers::admin::update_payment_handler))
        .route("/admin/users/{user_id}/role", put(crate::handlers::admin::update_role_handler))
        .route("/admin/users/{user_id}", delete(crate::handlers::admin::delete_user_handler))
        .route("/admin/activation-keys", post(crate::handlers::admin::create_key_handler))
        .route("/admin/activation-keys", get(crate::handlers::admin::list_keys_handler))
        .route("/admin/activation-keys/stats", get(crate::handlers::admin::key_stats_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
