//! Administrative authorization

use creditnft_common::AccountId;

/// Predicate deciding whether a caller may change engine-wide terms
pub trait AuthorizationCheck: Send + Sync {
    fn is_authorized(&self, caller: &AccountId) -> bool;
}

/// Single-owner authorization: only the configured admin account passes
#[derive(Debug, Clone)]
pub struct OwnerAuthorization {
    owner: AccountId,
}

impl OwnerAuthorization {
    pub fn new(owner: impl Into<AccountId>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }
}

impl AuthorizationCheck for OwnerAuthorization {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        caller == &self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_is_authorized() {
        let auth = OwnerAuthorization::new("deployer");
        assert!(auth.is_authorized(&AccountId::from("deployer")));
        assert!(!auth.is_authorized(&AccountId::from("user1")));
    }
}
