use serde::Serialize;

/// Single-use token gating paid access.
///
/// Lifecycle: unused -> used, exactly once. `expires_at` stays null until
/// redemption and is then fixed at `used_at` + 365 days.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivationKey {
    pub id: u32,
    pub key: String,
    pub is_used: bool,
    /// Admin account that issued the key.
    pub created_by: u32,
    /// Account that redeemed the key.
    pub user_id: Option<u32>,
    pub used_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
}
