use crate::models::user::{Role, User};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Uniqueness and invariant violations surfaced by the store. Mapped to
/// Conflict responses by the handlers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("An owner account already exists")]
    OwnerExists,
}

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub is_paid: bool,
    pub year_of_study: Option<u8>,
    pub speciality: Option<String>,
}

/// Store-level patch. The password arrives pre-hashed and permission
/// checks have already happened in the handler; the store only enforces
/// uniqueness and the singleton-owner invariant.
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_paid: Option<bool>,
    pub year_of_study: Option<u8>,
    pub speciality: Option<String>,
}

/// In-memory user store with unique email/username indexes.
pub struct UserStore {
    users: DashMap<u32, User>,
    by_email: DashMap<String, u32>,
    by_username: DashMap<String, u32>,
    next_id: AtomicU32,
    /// Serializes owner creation/promotion so the singleton check and the
    /// write are one unit.
    owner_guard: Mutex<()>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            by_email: DashMap::new(),
            by_username: DashMap::new(),
            next_id: AtomicU32::new(1),
            owner_guard: Mutex::new(()),
        }
    }

    pub fn create(&self, new: NewUser, now: i64) -> Result<User, UserStoreError> {
        let _guard = self.owner_guard.lock().expect("owner guard poisoned");

        if new.role == Role::Owner && self.find_owner().is_some() {
            return Err(UserStoreError::OwnerExists);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        match self.by_email.entry(new.email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(UserStoreError::EmailTaken),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }

        match self.by_username.entry(new.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                self.by_email.remove(&new.email);
                return Err(UserStoreError::UsernameTaken);
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }

        let user = User {
            id,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            is_paid: new.is_paid,
            year_of_study: new.year_of_study,
            speciality: new.speciality,
            created_at: now,
            updated_at: None,
        };

        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn find(&self, id: u32) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.by_email.get(email)?;
        self.find(id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let id = *self.by_username.get(username)?;
        self.find(id)
    }

    /// Linear scan; the owner is a singleton so first match wins.
    pub fn find_owner(&self) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.value().role == Role::Owner)
            .map(|entry| entry.value().clone())
    }

    pub fn list(&self, skip: usize, limit: usize) -> Vec<User> {
        self.list_filtered(None, None, skip, limit)
    }

    pub fn list_filtered(
        &self,
        role: Option<Role>,
        is_paid: Option<bool>,
        skip: usize,
        limit: usize,
    ) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| role.is_none_or(|r| entry.value().role == r))
            .filter(|entry| is_paid.is_none_or(|p| entry.value().is_paid == p))
            .map(|entry| entry.value().clone())
            .collect();

        users.sort_by_key(|user| user.id);
        users.into_iter().skip(skip).take(limit).collect()
    }

    pub fn update(&self, id: u32, patch: UserPatch, now: i64) -> Result<Option<User>, UserStoreError> {
        let _guard = self.owner_guard.lock().expect("owner guard poisoned");

        let Some(current) = self.find(id) else {
            return Ok(None);
        };

        if patch.role == Some(Role::Owner) {
            if let Some(owner) = self.find_owner() {
                if owner.id != id {
                    return Err(UserStoreError::OwnerExists);
                }
            }
        }

        // Re-point the unique indexes before touching the record
        if let Some(email) = &patch.email {
            if *email != current.email {
                match self.by_email.entry(email.clone()) {
                    dashmap::mapref::entry::Entry::Occupied(_) => {
                        return Err(UserStoreError::EmailTaken)
                    }
                    dashmap::mapref::entry::Entry::Vacant(entry) => {
                        entry.insert(id);
                    }
                }
                self.by_email.remove(&current.email);
            }
        }

        if let Some(username) = &patch.username {
            if *username != current.username {
                match self.by_username.entry(username.clone()) {
                    dashmap::mapref::entry::Entry::Occupied(_) => {
                        return Err(UserStoreError::UsernameTaken)
                    }
                    dashmap::mapref::entry::Entry::Vacant(entry) => {
                        entry.insert(id);
                    }
                }
                self.by_username.remove(&current.username);
            }
        }

        let updated = self.users.get_mut(&id).map(|mut entry| {
            let user = entry.value_mut();
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(username) = patch.username {
                user.username = username;
            }
            if let Some(password_hash) = patch.password_hash {
                user.password_hash = password_hash;
            }
            if let Some(role) = patch.role {
                user.role = role;
            }
            if let Some(is_paid) = patch.is_paid {
                user.is_paid = is_paid;
            }
            if let Some(year_of_study) = patch.year_of_study {
                user.year_of_study = Some(year_of_study);
            }
            if let Some(speciality) = patch.speciality {
                user.speciality = Some(speciality);
            }
            user.updated_at = Some(now);
            user.clone()
        });

        Ok(updated)
    }

    pub fn set_paid(&self, id: u32, is_paid: bool, now: i64) -> Option<User> {
        self.users.get_mut(&id).map(|mut entry| {
            let user = entry.value_mut();
            user.is_paid = is_paid;
            user.updated_at = Some(now);
            user.clone()
        })
    }

    pub fn set_role(&self, id: u32, role: Role, now: i64) -> Result<Option<User>, UserStoreError> {
        self.update(
            id,
            UserPatch {
                role: Some(role),
                ..Default::default()
            },
            now,
        )
    }

    pub fn delete(&self, id: u32) -> bool {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.by_email.remove(&user.email);
                self.by_username.remove(&user.username);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn count_paid(&self) -> usize {
        self.users.iter().filter(|entry| entry.value().is_paid).count()
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.users
            .iter()
            .filter(|entry| entry.value().role == role)
            .count()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
