// crates/lockstake-economics/src/roles.rs
//
// In-memory role membership. Administration of roles is outside the staking
// core; this registry only answers `has_role` for the engine.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use lockstake_core::{AccountId, Role, RoleAuthority};

/// Role membership table.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    members: RwLock<HashMap<Role, HashSet<AccountId>>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style grant, for wiring up an engine.
    pub fn with_member(self, role: Role, account: AccountId) -> Self {
        self.grant(role, account);
        self
    }

    pub fn grant(&self, role: Role, account: AccountId) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(role)
            .or_default()
            .insert(account);
    }

    pub fn revoke(&self, role: Role, account: &AccountId) {
        if let Some(set) = self
            .members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&role)
        {
            set.remove(account);
        }
    }
}

impl RoleAuthority for RoleRegistry {
    fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .is_some_and(|set| set.contains(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let registry = RoleRegistry::new();
        let slasher = AccountId::from_label("slasher");
        assert!(!registry.has_role(Role::PenaltyAuthority, &slasher));

        registry.grant(Role::PenaltyAuthority, slasher);
        assert!(registry.has_role(Role::PenaltyAuthority, &slasher));
        assert!(!registry.has_role(Role::Admin, &slasher));

        registry.revoke(Role::PenaltyAuthority, &slasher);
        assert!(!registry.has_role(Role::PenaltyAuthority, &slasher));
    }

    #[test]
    fn test_with_member() {
        let admin = AccountId::from_label("admin");
        let registry = RoleRegistry::new().with_member(Role::Admin, admin);
        assert!(registry.has_role(Role::Admin, &admin));
    }
}
