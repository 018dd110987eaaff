use crate::models::device::DeviceSession;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// At most this many active sessions per user.
pub const MAX_ACTIVE_DEVICES: usize = 2;

/// In-memory device-session store, keyed by user.
///
/// All mutations for one user run under that user's map entry, so the
/// count-evict-insert sequence of `register` is atomic with respect to
/// concurrent registrations for the same user.
pub struct DeviceStore {
    sessions: DashMap<u32, Vec<DeviceSession>>,
    next_id: AtomicU32,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Register a device for a user.
    ///
    /// A session with a matching fingerprint is reactivated in place and
    /// reuses its slot; an already-active match never touches the cap.
    /// In every other case the active count must stay within
    /// `MAX_ACTIVE_DEVICES` after the call, so the session with the
    /// oldest `last_seen` is deactivated first (tie-break: lowest id).
    pub fn register(
        &self,
        user_id: u32,
        fingerprint: &str,
        device_name: &str,
        now: i64,
    ) -> DeviceSession {
        let mut entry = self.sessions.entry(user_id).or_default();
        let sessions = entry.value_mut();

        if let Some(position) = sessions
            .iter()
            .position(|session| session.device_fingerprint == fingerprint)
        {
            // Reactivating a previously evicted row still has to respect
            // the cap
            if !sessions[position].is_active {
                evict_oldest_if_full(sessions);
            }
            let existing = &mut sessions[position];
            existing.is_active = true;
            existing.last_seen = now;
            return existing.clone();
        }

        evict_oldest_if_full(sessions);

        let session = DeviceSession {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            device_fingerprint: fingerprint.to_string(),
            device_name: device_name.to_string(),
            is_active: true,
            last_seen: now,
            created_at: now,
        };
        sessions.push(session.clone());
        session
    }

    /// Bump `last_seen` for an active matching session. Silently does
    /// nothing when no active session matches.
    pub fn touch(&self, user_id: u32, fingerprint: &str, now: i64) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            if let Some(session) = entry
                .value_mut()
                .iter_mut()
                .find(|session| session.is_active && session.device_fingerprint == fingerprint)
            {
                session.last_seen = now;
            }
        }
    }

    /// Deactivate one of the user's own sessions. Returns false when the
    /// session does not exist or belongs to someone else.
    pub fn deactivate(&self, user_id: u32, device_id: u32) -> bool {
        let Some(mut entry) = self.sessions.get_mut(&user_id) else {
            return false;
        };

        match entry
            .value_mut()
            .iter_mut()
            .find(|session| session.id == device_id)
        {
            Some(session) => {
                session.is_active = false;
                true
            }
            None => false,
        }
    }

    /// The user's active sessions, oldest first.
    pub fn active_sessions(&self, user_id: u32) -> Vec<DeviceSession> {
        let mut sessions: Vec<DeviceSession> = self
            .sessions
            .get(&user_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|session| session.is_active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sessions.sort_by_key(|session| (session.last_seen, session.id));
        sessions
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_oldest_if_full(sessions: &mut [DeviceSession]) {
    let active = sessions.iter().filter(|session| session.is_active).count();
    if active >= MAX_ACTIVE_DEVICES {
        if let Some(oldest) = sessions
            .iter_mut()
            .filter(|session| session.is_active)
            .min_by_key(|session| (session.last_seen, session.id))
        {
            oldest.is_active = false;
        }
    }
}
