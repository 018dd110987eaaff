use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::api::{
    AdminUserListQuery, DashboardResponse, KeyListQuery, KeyStats, ModuleCount,
    PaymentUpdateRequest, QuestionStats, RoleUpdateRequest, SuccessResponse, UserStats, YearCount,
};
use crate::models::user::Role;
use crate::security::auth::AuthUser;
use crate::security::permissions;
use crate::utils::time::current_timestamp;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

/// Aggregated statistics for the admin dashboard
///
/// GET /admin/dashboard
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    permissions::ensure_admin(&actor)?;

    let total_users = state.users.len();
    let paid_users = state.users.count_paid();
    let total_questions = state.questions.len();
    let total_answers = state.questions.count_answers();

    let user_stats = UserStats {
        total_users,
        paid_users,
        unpaid_users: total_users - paid_users,
        owner_users: state.users.count_by_role(Role::Owner),
        admin_users: state.users.count_by_role(Role::Admin),
        manager_users: state.users.count_by_role(Role::Manager),
        student_users: state.users.count_by_role(Role::Student),
    };

    let question_stats = QuestionStats {
        total_questions,
        total_answers,
        average_answers_per_question: if total_questions > 0 {
            total_answers as f64 / total_questions as f64
        } else {
            0.0
        },
    };

    let total_keys = state.keys.len();
    let used_keys = state.keys.count_used();
    let activation_key_stats = KeyStats {
        total_keys,
        used_keys,
        unused_keys: total_keys - used_keys,
    };

    let module_stats = state
        .questions
        .module_counts()
        .into_iter()
        .map(|(module, count)| ModuleCount { module, count })
        .collect();

    let year_stats = state
        .questions
        .year_counts()
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();

    Ok((
        StatusCode::OK,
        Json(DashboardResponse {
            user_stats,
            question_stats,
            activation_key_stats,
            module_stats,
            year_stats,
        }),
    )
        .into_response())
}

/// List accounts with role/payment filters (manager or admin)
///
/// GET /admin/users?role=<role>&is_paid=<bool>&skip=<n>&limit=<n>
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<AdminUserListQuery>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    let users = state
        .users
        .list_filtered(query.role, query.is_paid, query.skip, query.limit);

    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Detailed view of one account (manager or admin)
///
/// GET /admin/users/{user_id}/details
pub async fn user_details_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    let user = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok((StatusCode::OK, Json(user)).into_response())
}

/// Flip an account's payment flag (manager or admin)
///
/// PUT /admin/users/{user_id}/payment
pub async fn update_payment_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
    Json(payload): Json<PaymentUpdateRequest>,
) -> Result<Response, ApiError> {
    let target = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    permissions::ensure_payment_change(&actor, &target)?;

    state.users.set_paid(user_id, payload.is_paid, current_timestamp());

    info!(
        actor_id = actor.id,
        user_id = user_id,
        is_paid = payload.is_paid,
        "User payment status updated"
    );

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "User payment status updated successfully".to_string(),
        }),
    )
        .into_response())
}

/// Change an account's role (admin or owner)
///
/// PUT /admin/users/{user_id}/role
pub async fn update_role_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Response, ApiError> {
    let target = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    permissions::ensure_role_change(&actor, &target)?;

    state
        .users
        .set_role(user_id, payload.role, current_timestamp())
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    info!(
        actor_id = actor.id,
        user_id = user_id,
        role = payload.role.as_str(),
        "User role updated"
    );

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "User role updated successfully".to_string(),
        }),
    )
        .into_response())
}

/// Delete an account (admin or owner)
///
/// DELETE /admin/users/{user_id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<u32>,
) -> Result<Response, ApiError> {
    let target = state
        .users
        .find(user_id)
        .ok_or_else(|| ApiError::not_found("User"))?;

    permissions::ensure_admin_delete(&actor, &target)?;

    if !state.users.delete(user_id) {
        return Err(ApiError::not_found("User"));
    }

    info!(actor_id = actor.id, user_id = user_id, "User deleted by admin");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "User deleted successfully".to_string(),
        }),
    )
        .into_response())
}

/// Generate a new activation key (admin or owner)
///
/// POST /admin/activation-keys
pub async fn create_key_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    permissions::ensure_admin(&actor)?;

    let key = state.keys.generate(actor.id, current_timestamp());

    info!(key_id = key.id, created_by = actor.id, "Activation key created");

    Ok((StatusCode::OK, Json(key)).into_response())
}

/// List activation keys (admin or owner)
///
/// GET /admin/activation-keys?is_used=<bool>&skip=<n>&limit=<n>
pub async fn list_keys_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<KeyListQuery>,
) -> Result<Response, ApiError> {
    permissions::ensure_admin(&actor)?;

    let keys = state.keys.list(query.is_used, query.skip, query.limit);

    Ok((StatusCode::OK, Json(keys)).into_response())
}

/// Activation key usage counters (admin or owner)
///
/// GET /admin/activation-keys/stats
pub async fn key_stats_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    permissions::ensure_admin(&actor)?;

    let total_keys = state.keys.len();
    let used_keys = state.keys.count_used();

    Ok((
        StatusCode::OK,
        Json(KeyStats {
            total_keys,
            used_keys,
            unused_keys: total_keys - used_keys,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{seed_user, test_state};

    #[tokio::test]
    async fn test_dashboard_admin_only() {
        let state = test_state();
        let manager = seed_user(&state, "manager", Role::Manager, false);
        let admin = seed_user(&state, "admin", Role::Admin, false);

        let error = dashboard_handler(State(state.clone()), AuthUser(manager))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::FORBIDDEN);
        assert_eq!(error.to_string(), "Admin access required");

        let response = dashboard_handler(State(state.clone()), AuthUser(admin))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_payment_update_owner_target_protected() {
        let state = test_state();
        let owner = seed_user(&state, "owner", Role::Owner, true);
        let admin = seed_user(&state, "admin", Role::Admin, true);

        let error = update_payment_handler(
            State(state.clone()),
            AuthUser(admin),
            Path(owner.id),
            Json(PaymentUpdateRequest { is_paid: false }),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status(), StatusCode::FORBIDDEN);
        assert_eq!(error.to_string(), "Owner users cannot be edited by anyone else");
        assert!(state.users.find(owner.id).unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_payment_update_by_manager() {
        let state = test_state();
        let manager = seed_user(&state, "manager", Role::Manager, false);
        let student = seed_user(&state, "student", Role::Student, false);

        let response = update_payment_handler(
            State(state.clone()),
            AuthUser(manager),
            Path(student.id),
            Json(PaymentUpdateRequest { is_paid: true }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.users.find(student.id).unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_role_update_admin_gate_and_self_guard() {
        let state = test_state();
        let admin = seed_user(&state, "admin", Role::Admin, false);
        let manager = seed_user(&state, "manager", Role::Manager, false);
        let student = seed_user(&state, "student", Role::Student, false);

        // Managers hit the admin gate
        let error = update_role_handler(
            State(state.clone()),
            AuthUser(manager),
            Path(student.id),
            Json(RoleUpdateRequest { role: Role::Manager }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::FORBIDDEN);

        // Admins cannot change their own role
        let error = update_role_handler(
            State(state.clone()),
            AuthUser(admin.clone()),
            Path(admin.id),
            Json(RoleUpdateRequest { role: Role::Student }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.to_string(), "Cannot change your own role");

        // Admins can promote others
        update_role_handler(
            State(state.clone()),
            AuthUser(admin),
            Path(student.id),
            Json(RoleUpdateRequest { role: Role::Manager }),
        )
        .await
        .unwrap();
        assert_eq!(state.users.find(student.id).unwrap().role, Role::Manager);
    }

    #[tokio::test]
    async fn test_owner_may_demote_itself() {
        let state = test_state();
        let owner = seed_user(&state, "owner", Role::Owner, true);

        let response = update_role_handler(
            State(state.clone()),
            AuthUser(owner.clone()),
            Path(owner.id),
            Json(RoleUpdateRequest { role: Role::Admin }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.users.find(owner.id).unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_admin_delete_rules() {
        let state = test_state();
        let owner = seed_user(&state, "owner", Role::Owner, true);
        let admin = seed_user(&state, "admin", Role::Admin, false);
        let student = seed_user(&state, "student", Role::Student, false);

        // Owner target is immune
        let error = delete_user_handler(State(state.clone()), AuthUser(admin.clone()), Path(owner.id))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::FORBIDDEN);

        // Admin cannot delete itself through the admin path
        let error = delete_user_handler(State(state.clone()), AuthUser(admin.clone()), Path(admin.id))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Cannot delete your own account");

        // Deleting a student works
        let response = delete_user_handler(State(state.clone()), AuthUser(admin), Path(student.id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.users.find(student.id).is_none());

        // Missing target is a 404
        let owner_user = state.users.find(owner.id).unwrap();
        let error = delete_user_handler(State(state.clone()), AuthUser(owner_user), Path(student.id))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_key_endpoints_admin_only() {
        let state = test_state();
        let manager = seed_user(&state, "manager", Role::Manager, false);
        let admin = seed_user(&state, "admin", Role::Admin, false);

        let error = create_key_handler(State(state.clone()), AuthUser(manager))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::FORBIDDEN);

        create_key_handler(State(state.clone()), AuthUser(admin.clone()))
            .await
            .unwrap();
        create_key_handler(State(state.clone()), AuthUser(admin.clone()))
            .await
            .unwrap();

        let response = list_keys_handler(
            State(state.clone()),
            AuthUser(admin.clone()),
            Query(KeyListQuery {
                skip: 0,
                limit: 100,
                is_used: Some(false),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.keys.len(), 2);

        let response = key_stats_handler(State(state.clone()), AuthUser(admin))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_user_list_filters() {
        let state = test_state();
        let admin = seed_user(&state, "admin", Role::Admin, false);
        seed_user(&state, "student1", Role::Student, true);
        seed_user(&state, "student2", Role::Student, false);

        let response = list_users_handler(
            State(state.clone()),
            AuthUser(admin),
            Query(AdminUserListQuery {
                skip: 0,
                limit: 100,
                role: Some(Role::Student),
                is_paid: Some(true),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
