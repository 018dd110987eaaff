use crate::models::activation::ActivationKey;
use crate::utils::time::SECONDS_PER_DAY;
use dashmap::DashMap;
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Token alphabet: uppercase letters and digits.
pub const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed token length.
pub const KEY_LENGTH: usize = 16;

/// Redeemed keys grant access for 365 days.
pub const KEY_VALIDITY_SECS: i64 = 365 * SECONDS_PER_DAY;

/// Redemption deliberately does not reveal whether the key never existed
/// or was already spent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RedeemError {
    #[error("Invalid or already used activation key")]
    NotFoundOrUsed,
}

/// In-memory activation-key store, keyed by the token string.
pub struct KeyStore {
    keys: DashMap<String, ActivationKey>,
    next_id: AtomicU32,
}

impl KeyStore {
    pub fn new() -> Self {
        Self {
            keys: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Generate a fresh unique key.
    ///
    /// Collisions at 16 chars over a 36-symbol alphabet are negligible,
    /// but uniqueness is still checked explicitly: the sampled token is
    /// only accepted if no stored key matches (rejection sampling via the
    /// vacant-entry insert).
    pub fn generate(&self, created_by: u32, now: i64) -> ActivationKey {
        loop {
            let token = random_token();

            match self.keys.entry(token.clone()) {
                dashmap::mapref::entry::Entry::Occupied(_) => continue,
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let key = ActivationKey {
                        id: self.next_id.fetch_add(1, Ordering::Relaxed),
                        key: token,
                        is_used: false,
                        created_by,
                        user_id: None,
                        used_at: None,
                        expires_at: None,
                        created_at: now,
                    };
                    entry.insert(key.clone());
                    return key;
                }
            }
        }
    }

    /// Flip a key unused -> used for `user_id`.
    ///
    /// The entire check-and-set happens under the entry's write lock, so a
    /// key can never be redeemed twice even under concurrent requests.
    /// The caller flips the user's payment flag after this returns; the
    /// key mutation here is the commit point.
    pub fn redeem(&self, key: &str, user_id: u32, now: i64) -> Result<ActivationKey, RedeemError> {
        let mut entry = self.keys.get_mut(key).ok_or(RedeemError::NotFoundOrUsed)?;

        if entry.is_used {
            return Err(RedeemError::NotFoundOrUsed);
        }

        entry.is_used = true;
        entry.user_id = Some(user_id);
        entry.used_at = Some(now);
        entry.expires_at = Some(now + KEY_VALIDITY_SECS);

        Ok(entry.clone())
    }

    /// Latest expiry among the user's redeemed keys, if any.
    pub fn valid_until(&self, user_id: u32) -> Option<i64> {
        self.keys
            .iter()
            .filter(|entry| entry.value().user_id == Some(user_id))
            .filter_map(|entry| entry.value().expires_at)
            .max()
    }

    /// True iff the user holds a redeemed key that has not expired.
    /// A user with zero redeemed keys is invalid.
    pub fn is_valid(&self, user_id: u32, now: i64) -> bool {
        self.valid_until(user_id).is_some_and(|expires_at| now < expires_at)
    }

    pub fn list(&self, is_used: Option<bool>, skip: usize, limit: usize) -> Vec<ActivationKey> {
        let mut keys: Vec<ActivationKey> = self
            .keys
            .iter()
            .filter(|entry| is_used.is_none_or(|used| entry.value().is_used == used))
            .map(|entry| entry.value().clone())
            .collect();

        keys.sort_by_key(|key| key.id);
        keys.into_iter().skip(skip).take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn count_used(&self) -> usize {
        self.keys.iter().filter(|entry| entry.value().is_used).count()
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token() -> String {
    let mut rng = rand::rng();

    (0..KEY_LENGTH)
        .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}
