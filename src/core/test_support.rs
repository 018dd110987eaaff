//! Shared fixtures for handler tests.

use crate::core::config::{AuthConfig, Config, LoggingConfig, ServerConfig};
use crate::core::state::AppState;
use crate::models::user::{Role, User};
use crate::stores::user_store::NewUser;
use std::sync::Arc;

pub fn test_config() -> Config {
    Config {
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
    }
}

pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(test_config()))
}

pub fn seed_user(state: &AppState, username: &str, role: Role, is_paid: bool) -> User {
    state
        .users
        .create(
            NewUser {
                email: format!("{username}@test.dz"),
                username: username.to_string(),
                password_hash: "digest".to_string(),
                role,
                is_paid,
                year_of_study: None,
                speciality: None,
            },
            100,
        )
        .unwrap()
}
