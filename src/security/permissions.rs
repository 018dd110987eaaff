//! Role/permission decision logic.
//!
//! Every access decision in the API goes through the functions here; call
//! sites never compare roles ad hoc. All functions are pure: given the
//! actor, the optional target and the requested change, they return
//! `Ok(())` or a denial reason, and never panic on well-formed input.
//!
//! Rule precedence: owner-target immunity is absolute and checked before
//! any tier-based rule. An owner account can only be mutated or deleted by
//! itself, regardless of the actor's own role.

use crate::models::user::{Role, User, UserUpdate};
use thiserror::Error;

/// Denial reasons. The display strings are surfaced verbatim in 403
/// responses, so each names the tier or rule that failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    #[error("Owner access required")]
    OwnerRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Manager or admin access required")]
    ManagerRequired,

    #[error("Paid subscription required")]
    PaidRequired,

    #[error("Owner users cannot be edited by anyone else")]
    OwnerProtected,

    #[error("Cannot change your own role")]
    OwnRoleChange,

    #[error("Only admins and owners can change user roles")]
    RoleChangeRequiresAdmin,

    #[error("Only managers and admins can change payment status")]
    PaymentChangeRequiresManager,

    #[error("Cannot delete your own account")]
    OwnAccountDelete,

    #[error("Not enough permissions")]
    NotPermitted,
}

pub fn ensure_owner(actor: &User) -> Result<(), Denied> {
    if actor.role == Role::Owner {
        Ok(())
    } else {
        Err(Denied::OwnerRequired)
    }
}

pub fn ensure_admin(actor: &User) -> Result<(), Denied> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(Denied::AdminRequired)
    }
}

pub fn ensure_manager(actor: &User) -> Result<(), Denied> {
    if actor.role.is_manager() {
        Ok(())
    } else {
        Err(Denied::ManagerRequired)
    }
}

/// Paid-access gate. Only the owner bypasses payment; an unpaid admin is
/// still denied.
pub fn ensure_paid(actor: &User) -> Result<(), Denied> {
    if actor.role == Role::Owner || actor.is_paid {
        Ok(())
    } else {
        Err(Denied::PaidRequired)
    }
}

/// Owner-target immunity (the absolute rule). Applies to every mutating
/// action against a target account.
pub fn ensure_target_mutable(actor: &User, target: &User) -> Result<(), Denied> {
    if target.role == Role::Owner && actor.id != target.id {
        Err(Denied::OwnerProtected)
    } else {
        Ok(())
    }
}

/// Profile read: self, or manager tier.
pub fn ensure_read_user(actor: &User, target_id: u32) -> Result<(), Denied> {
    if actor.id == target_id || actor.role.is_manager() {
        Ok(())
    } else {
        Err(Denied::NotPermitted)
    }
}

/// Generic profile-update path. Checks, in order: owner-target immunity,
/// self-or-manager access, then the per-field gates for `role` and
/// `is_paid`.
pub fn ensure_update_user(actor: &User, target: &User, update: &UserUpdate) -> Result<(), Denied> {
    ensure_target_mutable(actor, target)?;

    if actor.id != target.id && !actor.role.is_manager() {
        return Err(Denied::NotPermitted);
    }

    if update.role.is_some() {
        if !actor.role.is_admin() {
            return Err(Denied::RoleChangeRequiresAdmin);
        }
        if actor.id == target.id && actor.role != Role::Owner {
            return Err(Denied::OwnRoleChange);
        }
    }

    if update.is_paid.is_some() && !actor.role.is_manager() {
        return Err(Denied::PaymentChangeRequiresManager);
    }

    Ok(())
}

/// Generic delete path: self-delete only. Admin-forced deletion goes
/// through `ensure_admin_delete`.
pub fn ensure_self_delete(actor: &User, target: &User) -> Result<(), Denied> {
    ensure_target_mutable(actor, target)?;

    if actor.id == target.id {
        Ok(())
    } else {
        Err(Denied::NotPermitted)
    }
}

/// Admin-only delete endpoint. Admins may not delete themselves through
/// it; the owner may.
pub fn ensure_admin_delete(actor: &User, target: &User) -> Result<(), Denied> {
    ensure_target_mutable(actor, target)?;
    ensure_admin(actor)?;

    if actor.id == target.id && actor.role != Role::Owner {
        return Err(Denied::OwnAccountDelete);
    }

    Ok(())
}

/// Dedicated role-change endpoint (admin tier).
pub fn ensure_role_change(actor: &User, target: &User) -> Result<(), Denied> {
    ensure_target_mutable(actor, target)?;
    ensure_admin(actor)?;

    if actor.id == target.id && actor.role != Role::Owner {
        return Err(Denied::OwnRoleChange);
    }

    Ok(())
}

/// Dedicated payment-status endpoint (manager tier).
pub fn ensure_payment_change(actor: &User, target: &User) -> Result<(), Denied> {
    ensure_target_mutable(actor, target)?;
    ensure_manager(actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u32, role: Role, is_paid: bool) -> User {
        User {
            id,
            email: format!("user{id}@test.dz"),
            username: format!("user{id}"),
            password_hash: String::new(),
            role,
            is_paid,
            year_of_study: None,
            speciality: None,
            created_at: 0,
            updated_at: None,
        }
    }

    fn role_patch(role: Role) -> UserUpdate {
        UserUpdate {
            role: Some(role),
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_target_immune_to_every_role() {
        let owner = user(1, Role::Owner, true);

        for actor_role in [Role::Admin, Role::Manager, Role::Student] {
            let actor = user(2, actor_role, true);

            assert_eq!(
                ensure_target_mutable(&actor, &owner),
                Err(Denied::OwnerProtected)
            );
            assert_eq!(
                ensure_role_change(&actor, &owner),
                Err(Denied::OwnerProtected)
            );
            assert_eq!(
                ensure_payment_change(&actor, &owner),
                Err(Denied::OwnerProtected)
            );
            assert_eq!(
                ensure_admin_delete(&actor, &owner),
                Err(Denied::OwnerProtected)
            );
            assert_eq!(
                ensure_update_user(&actor, &owner, &UserUpdate::default()),
                Err(Denied::OwnerProtected)
            );
        }
    }

    #[test]
    fn test_owner_immunity_precedes_tier_checks() {
        // A student actor against an owner target gets the immunity denial,
        // not the tier denial: rule 1 is checked first.
        let owner = user(1, Role::Owner, true);
        let student = user(3, Role::Student, false);

        assert_eq!(
            ensure_role_change(&student, &owner),
            Err(Denied::OwnerProtected)
        );
    }

    #[test]
    fn test_owner_may_mutate_and_delete_self() {
        let owner = user(1, Role::Owner, true);

        assert!(ensure_target_mutable(&owner, &owner).is_ok());
        assert!(ensure_self_delete(&owner, &owner).is_ok());
        assert!(ensure_admin_delete(&owner, &owner).is_ok());
        assert!(ensure_role_change(&owner, &owner).is_ok());
        assert!(ensure_update_user(&owner, &owner, &role_patch(Role::Admin)).is_ok());
    }

    #[test]
    fn test_tier_gates() {
        assert!(ensure_owner(&user(1, Role::Owner, false)).is_ok());
        assert_eq!(
            ensure_owner(&user(1, Role::Admin, false)),
            Err(Denied::OwnerRequired)
        );

        assert!(ensure_admin(&user(1, Role::Owner, false)).is_ok());
        assert!(ensure_admin(&user(1, Role::Admin, false)).is_ok());
        assert_eq!(
            ensure_admin(&user(1, Role::Manager, false)),
            Err(Denied::AdminRequired)
        );

        assert!(ensure_manager(&user(1, Role::Manager, false)).is_ok());
        assert_eq!(
            ensure_manager(&user(1, Role::Student, false)),
            Err(Denied::ManagerRequired)
        );
    }

    #[test]
    fn test_paid_gate_owner_bypass_only() {
        assert!(ensure_paid(&user(1, Role::Owner, false)).is_ok());
        assert!(ensure_paid(&user(1, Role::Student, true)).is_ok());

        // Payment bypass is not privilege-monotonic: unpaid admin is denied
        assert_eq!(
            ensure_paid(&user(1, Role::Admin, false)),
            Err(Denied::PaidRequired)
        );
        assert_eq!(
            ensure_paid(&user(1, Role::Student, false)),
            Err(Denied::PaidRequired)
        );
    }

    #[test]
    fn test_read_user_self_or_manager() {
        let student = user(5, Role::Student, false);
        assert!(ensure_read_user(&student, 5).is_ok());
        assert_eq!(ensure_read_user(&student, 6), Err(Denied::NotPermitted));

        let manager = user(7, Role::Manager, false);
        assert!(ensure_read_user(&manager, 6).is_ok());
    }

    #[test]
    fn test_update_user_self_allowed_without_role_field() {
        let student = user(5, Role::Student, false);
        let update = UserUpdate {
            username: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(ensure_update_user(&student, &student, &update).is_ok());
    }

    #[test]
    fn test_update_user_role_field_requires_admin() {
        let manager = user(5, Role::Manager, false);
        let target = user(6, Role::Student, false);

        assert_eq!(
            ensure_update_user(&manager, &target, &role_patch(Role::Manager)),
            Err(Denied::RoleChangeRequiresAdmin)
        );

        let admin = user(7, Role::Admin, false);
        assert!(ensure_update_user(&admin, &target, &role_patch(Role::Manager)).is_ok());
    }

    #[test]
    fn test_update_user_own_role_change_denied_except_owner() {
        let admin = user(5, Role::Admin, false);
        assert_eq!(
            ensure_update_user(&admin, &admin, &role_patch(Role::Student)),
            Err(Denied::OwnRoleChange)
        );

        let owner = user(1, Role::Owner, true);
        assert!(ensure_update_user(&owner, &owner, &role_patch(Role::Admin)).is_ok());
    }

    #[test]
    fn test_update_user_is_paid_field_requires_manager() {
        // A student cannot flip their own payment flag through the
        // generic path.
        let student = user(5, Role::Student, false);
        let update = UserUpdate {
            is_paid: Some(true),
            ..Default::default()
        };
        assert_eq!(
            ensure_update_user(&student, &student, &update),
            Err(Denied::PaymentChangeRequiresManager)
        );

        let manager = user(6, Role::Manager, false);
        let target = user(5, Role::Student, false);
        assert!(ensure_update_user(&manager, &target, &update).is_ok());
    }

    #[test]
    fn test_generic_delete_is_self_only() {
        let admin = user(5, Role::Admin, false);
        let target = user(6, Role::Student, false);

        assert_eq!(ensure_self_delete(&admin, &target), Err(Denied::NotPermitted));
        assert!(ensure_self_delete(&target, &target).is_ok());
    }

    #[test]
    fn test_admin_delete_rules() {
        let admin = user(5, Role::Admin, false);
        let target = user(6, Role::Student, false);
        assert!(ensure_admin_delete(&admin, &target).is_ok());

        // Admins cannot delete themselves through the admin path
        assert_eq!(
            ensure_admin_delete(&admin, &admin),
            Err(Denied::OwnAccountDelete)
        );

        let manager = user(7, Role::Manager, false);
        assert_eq!(
            ensure_admin_delete(&manager, &target),
            Err(Denied::AdminRequired)
        );
    }

    #[test]
    fn test_role_change_self_guard() {
        let admin = user(5, Role::Admin, false);
        assert_eq!(ensure_role_change(&admin, &admin), Err(Denied::OwnRoleChange));

        let owner = user(1, Role::Owner, true);
        assert!(ensure_role_change(&owner, &owner).is_ok());
    }

    #[test]
    fn test_payment_change_manager_tier() {
        let manager = user(5, Role::Manager, false);
        let student = user(6, Role::Student, false);
        assert!(ensure_payment_change(&manager, &student).is_ok());

        assert_eq!(
            ensure_payment_change(&student, &manager),
            Err(Denied::ManagerRequired)
        );
    }
}
