use serde::Serialize;

/// Binding between a user and one physical device/browser.
///
/// At most two of a user's sessions are active at a time; registering a
/// third evicts the one with the oldest `last_seen`.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceSession {
    pub id: u32,
    pub user_id: u32,
    /// Stable identifier per physical device/browser.
    pub device_fingerprint: String,
    pub device_name: String,
    pub is_active: bool,
    pub last_seen: i64,
    pub created_at: i64,
}
