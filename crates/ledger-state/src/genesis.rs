use crate::{
    error::{LedgerError, Result},
    transaction::Account,
};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Initial balance allocation, read once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub genesis_time: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    pub balances: HashMap<Account, u64>,
}

pub fn load_genesis(path: impl AsRef<Path>) -> Result<Genesis> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|e| LedgerError::io(path, e))?;

    serde_json::from_slice(&content).map_err(|source| LedgerError::Format {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_genesis(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("genesis.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_genesis() {
        let dir = TempDir::new().unwrap();
        let path = write_genesis(
            &dir,
            r#"{
                "genesis_time": "2019-03-18T00:00:00.000000000Z",
                "chain_id": "the-blockchain-bar-ledger",
                "balances": { "andrej": 1000000, "babayaga": 0 }
            }"#,
        );

        let genesis = load_genesis(&path).unwrap();

        assert_eq!(genesis.chain_id.as_deref(), Some("the-blockchain-bar-ledger"));
        assert_eq!(genesis.balances.len(), 2);
        assert_eq!(genesis.balances[&Account::from("andrej")], 1_000_000);
        assert_eq!(genesis.balances[&Account::from("babayaga")], 0);
    }

    #[test]
    fn test_balances_only() {
        let dir = TempDir::new().unwrap();
        let path = write_genesis(&dir, r#"{"balances": {"a": 100}, "extra": true}"#);

        let genesis = load_genesis(&path).unwrap();

        assert!(genesis.genesis_time.is_none());
        assert_eq!(genesis.balances[&Account::from("a")], 100);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();

        let result = load_genesis(dir.path().join("missing.json"));

        assert!(matches!(result, Err(LedgerError::Io { .. })));
    }

    #[test]
    fn test_malformed_content() {
        let dir = TempDir::new().unwrap();

        for content in [
            "not json",
            r#"{"chain_id": "x"}"#,
            r#"{"balances": {"a": -1}}"#,
            r#"{"balances": ["a", 1]}"#,
        ] {
            let path = write_genesis(&dir, content);
            let result = load_genesis(&path);

            assert!(
                matches!(result, Err(LedgerError::Format { .. })),
                "accepted {content}"
            );
        }
    }
}
