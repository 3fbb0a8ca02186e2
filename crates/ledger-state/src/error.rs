use crate::transaction::Account;
use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Genesis or log content that does not decode into the expected shape
    #[error("Malformed record in {} at line {line}: {source}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode transaction record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Insufficient balance: account '{account}' holds {balance}, needs {value}")]
    InsufficientBalance {
        account: Account,
        balance: u64,
        value: u64,
    },

    #[error("Balance overflow: account '{account}' holds {balance}, cannot credit {value}")]
    BalanceOverflow {
        account: Account,
        balance: u64,
        value: u64,
    },
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Transfer-level rejections leave the ledger untouched and may be retried
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. } | Self::BalanceOverflow { .. }
        )
    }
}
