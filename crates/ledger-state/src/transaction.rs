use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker carried in `data` by transactions that mint new balance
pub const REWARD_MARKER: &str = "reward";

/// Opaque balance holder name
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Account {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Value transfer record, one per line in the transaction log
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tx {
    pub from: Account,
    pub to: Account,
    pub value: u64,
    #[serde(default)]
    pub data: String,
}

impl Tx {
    pub fn new(
        from: impl Into<Account>,
        to: impl Into<Account>,
        value: u64,
        data: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value,
            data: data.into(),
        }
    }

    /// Mint `value` into `to` without a sender
    pub fn reward(to: impl Into<Account>, value: u64) -> Self {
        Self::new(Account::default(), to, value, REWARD_MARKER)
    }

    pub fn is_reward(&self) -> bool {
        self.data == REWARD_MARKER
    }
}
