//! Identities: the owning account and the minted credit instrument

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an account that owns or operates on credit lines
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a minted credit instrument. Allocated sequentially from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl TokenId {
    pub const FIRST: TokenId = TokenId(1);

    /// The identifier allocated after this one, `None` once ids run out
    pub fn next(self) -> Option<TokenId> {
        self.0.checked_add(1).map(TokenId)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ids_are_sequential() {
        assert_eq!(TokenId::FIRST.next(), Some(TokenId(2)));
        assert_eq!(TokenId::FIRST.to_string(), "#1");
    }

    #[test]
    fn test_token_ids_run_out_without_wrapping() {
        assert_eq!(TokenId(u64::MAX).next(), None);
    }
}
