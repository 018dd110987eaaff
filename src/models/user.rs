use serde::{Deserialize, Serialize};

/// Privilege tier of an account.
///
/// Total order of privilege: owner > admin > manager > student. The two
/// carve-outs (payment bypass and owner self-exclusivity) live in the
/// permission engine, never at call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Manager,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Student => "student",
        }
    }

    /// True for roles allowed to administer accounts and activation keys.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }

    /// True for roles allowed to manage users and author questions.
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin | Role::Owner)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub username: String,
    /// Argon2id digest in PHC string format. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_paid: bool,
    /// Academic year (1-3), filled in by students during registration.
    pub year_of_study: Option<u8>,
    pub speciality: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Explicitly enumerated patchable fields for the generic profile-update
/// path. `role` and `is_paid` stay listed here because the generic path
/// accepts them for sufficiently privileged actors; the permission engine
/// gates both before the store ever sees the patch.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_paid: Option<bool>,
    pub year_of_study: Option<u8>,
    pub speciality: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.is_paid.is_none()
            && self.year_of_study.is_none()
            && self.speciality.is_none()
    }
}
