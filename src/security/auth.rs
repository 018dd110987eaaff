//! Bearer-token authentication for request handlers.
//!
//! `AuthUser` is an axum extractor: it reads the `Authorization: Bearer`
//! header, verifies the HS256 token and loads the account, so handlers
//! receive the authenticated user as a plain argument.

use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::models::user::User;
use crate::security::token::{self, Claims};
use crate::utils::time::current_timestamp;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

/// The authenticated account behind the current request.
pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Auth("Missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Auth("Missing bearer token".to_string()))?;

        let claims = token::decode(
            state.config.auth.token_secret.as_bytes(),
            token,
            current_timestamp(),
        )
        .map_err(|e| ApiError::Auth(e.to_string()))?;

        let user = state
            .users
            .find(claims.sub)
            .ok_or_else(|| ApiError::Auth("Invalid token".to_string()))?;

        Ok(AuthUser(user))
    }
}

/// Issue a bearer token for a freshly authenticated user.
pub fn issue_token(state: &AppState, user_id: u32, now: i64) -> String {
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + state.config.auth.token_ttl_secs,
    };

    token::encode(state.config.auth.token_secret.as_bytes(), &claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AuthConfig, Config, LoggingConfig, ServerConfig};
    use crate::models::user::Role;
    use crate::stores::user_store::NewUser;
    use axum::http::Request;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                port: Some(8000),
                unix_socket: None,
                num_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                console: false,
            },
            auth: AuthConfig {
                token_secret: "0123456789abcdef0123456789abcdef".to_string(),
                token_ttl_secs: 3600,
            },
            bootstrap: None,
        };
        Arc::new(AppState::new(config))
    }

    fn seed_user(state: &AppState) -> User {
        state
            .users
            .create(
                NewUser {
                    email: "a@test.dz".to_string(),
                    username: "alice".to_string(),
                    password_hash: "digest".to_string(),
                    role: Role::Student,
                    is_paid: false,
                    year_of_study: None,
                    speciality: None,
                },
                100,
            )
            .unwrap()
    }

    async fn extract(state: &Arc<AppState>, header: Option<&str>) -> Result<AuthUser, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();

        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_token_loads_user() {
        let state = test_state();
        let user = seed_user(&state);
        let token = issue_token(&state, user.id, current_timestamp());

        let auth = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(auth.0.id, user.id);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let state = test_state();
        seed_user(&state);

        assert!(extract(&state, None).await.is_err());
        assert!(extract(&state, Some("Basic abc")).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let state = test_state();
        seed_user(&state);

        assert!(extract(&state, Some("Bearer not.a.token")).await.is_err());
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let state = test_state();
        let user = seed_user(&state);
        let token = issue_token(&state, user.id, current_timestamp());
        state.users.delete(user.id);

        assert!(extract(&state, Some(&format!("Bearer {token}"))).await.is_err());
    }
}
