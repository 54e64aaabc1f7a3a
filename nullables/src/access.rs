//! Nullable access control: a fixed owner plus an administrator set.

use std::collections::HashSet;
use trickle_interfaces::{AccessControl, AccessError};
use trickle_types::AccountId;

/// In-memory access control. The owner is always an administrator.
#[derive(Clone, Debug)]
pub struct NullAccessControl {
    owner: AccountId,
    admins: HashSet<AccountId>,
}

impl NullAccessControl {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            admins: HashSet::new(),
        }
    }

    pub fn grant(&mut self, admin: AccountId) {
        self.admins.insert(admin);
    }

    pub fn revoke(&mut self, admin: &AccountId) {
        self.admins.remove(admin);
    }
}

impl AccessControl for NullAccessControl {
    fn owner(&self) -> AccountId {
        self.owner
    }

    fn require_administrator(&self, caller: &AccountId) -> Result<(), AccessError> {
        if *caller == self.owner || self.admins.contains(caller) {
            Ok(())
        } else {
            Err(AccessError::NotAdministrator(*caller))
        }
    }
}
