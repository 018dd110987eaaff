// Application state (AppState)

use crate::core::config::Config;
use crate::stores::device_store::DeviceStore;
use crate::stores::key_store::KeyStore;
use crate::stores::question_store::QuestionStore;
use crate::stores::user_store::UserStore;
use std::sync::Arc;

/// Shared application state
///
/// Contains the stores and configuration accessed by request handlers.
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Account records plus the unique email/username indexes
    pub users: Arc<UserStore>,

    /// Question bank
    pub questions: Arc<QuestionStore>,

    /// Activation keys
    pub keys: Arc<KeyStore>,

    /// Device sessions
    pub devices: Arc<DeviceStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            users: Arc::new(UserStore::new()),
            questions: Arc::new(QuestionStore::new()),
            keys: Arc::new(KeyStore::new()),
            devices: Arc::new(DeviceStore::new()),
            config: Arc::new(config),
        }
    }
}
