// Startup tasks: owner bootstrap

use crate::core::state::AppState;
use crate::models::user::Role;
use crate::security::password;
use crate::stores::user_store::{NewUser, UserStoreError};
use crate::utils::time::current_timestamp;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Create the owner account from the `[bootstrap]` config section.
///
/// The store enforces the singleton-owner invariant; an existing owner
/// simply short-circuits the bootstrap. Any other conflict (the
/// configured email or username already taken by a non-owner) is a hard
/// startup error, since the deployment would otherwise run without its
/// super-role.
pub fn bootstrap_owner(state: &AppState) -> Result<()> {
    let Some(bootstrap) = &state.config.bootstrap else {
        info!("No bootstrap section configured, skipping owner creation");
        return Ok(());
    };

    if let Some(owner) = state.users.find_owner() {
        info!(owner_id = owner.id, "Owner account already exists, skipping bootstrap");
        return Ok(());
    }

    let password_hash = password::hash_password(&bootstrap.owner_password)
        .context("Failed to hash bootstrap owner password")?;

    let result = state.users.create(
        NewUser {
            email: bootstrap.owner_email.clone(),
            username: bootstrap.owner_username.clone(),
            password_hash,
            role: Role::Owner,
            // The owner is always paid
            is_paid: true,
            year_of_study: None,
            speciality: None,
        },
        current_timestamp(),
    );

    match result {
        Ok(owner) => {
            info!(owner_id = owner.id, username = %owner.username, "Owner account created");
            Ok(())
        }
        Err(UserStoreError::OwnerExists) => {
            // Lost a race with a concurrent bootstrap; the invariant held
            warn!("Owner account appeared concurrently, skipping bootstrap");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create owner account: {e}")),
    }
}
