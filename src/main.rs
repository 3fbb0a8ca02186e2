mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{BalancesCommand, CliConfig, Command, Config, TxCommand};
use ledger_state::{State, Tx};
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

/// Balance row written to stdout
#[derive(Debug, Serialize)]
struct BalanceOutput<'a> {
    account: &'a str,
    balance: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    match &config.command {
        Command::Balances(BalancesCommand::List) => {
            let stdout = io::stdout();
            list_balances(&config, stdout.lock())?;
        }
        Command::Tx(TxCommand::Add {
            from,
            to,
            value,
            data,
        }) => {
            add_transaction(&config, Tx::new(from.as_str(), to.as_str(), *value, data.as_str()))?;

            info!("Transaction successfully added to the ledger");
        }
    }

    Ok(())
}

fn open_state<C: Config>(config: &C) -> Result<State> {
    State::new_from_disk(config.genesis_path(), config.log_path())
        .context("Failed to load ledger state from disk")
}

fn list_balances<C: Config, W: Write>(config: &C, out: W) -> Result<()> {
    let state = open_state(config)?;

    let mut balances: Vec<_> = state.balances().iter().collect();
    balances.sort_unstable_by_key(|(account, _)| *account);

    let mut writer = csv::WriterBuilder::new().from_writer(out);

    for (account, balance) in balances {
        writer
            .serialize(BalanceOutput {
                account: account.as_str(),
                balance: *balance,
            })
            .context("Failed to serialize balance")?;
    }

    writer.flush().context("Failed to flush balances")?;

    state.close().context("Failed to close transaction log")
}

fn add_transaction<C: Config>(config: &C, tx: Tx) -> Result<()> {
    let mut state = open_state(config)?;

    state.add(tx).context("Transaction rejected")?;
    state.persist().context("Failed to persist transaction")?;

    state.close().context("Failed to close transaction log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    struct TestConfig(PathBuf);

    impl Config for TestConfig {
        fn data_dir(&self) -> &Path {
            &self.0
        }
    }

    fn setup() -> (TempDir, TestConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("genesis.json"),
            r#"{"balances": {"andrej": 1000000, "babayaga": 0}}"#,
        )
        .unwrap();
        let config = TestConfig(dir.path().to_path_buf());

        (dir, config)
    }

    fn listed(config: &TestConfig) -> String {
        let mut out = Vec::new();
        list_balances(config, &mut out).unwrap();

        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_genesis_balances() {
        let (_dir, config) = setup();

        assert_eq!(
            listed(&config),
            "account,balance\nandrej,1000000\nbabayaga,0\n"
        );
    }

    #[test]
    fn test_add_then_list() {
        let (_dir, config) = setup();

        add_transaction(&config, Tx::new("andrej", "babayaga", 2000, "")).unwrap();
        add_transaction(&config, Tx::reward("andrej", 700)).unwrap();

        assert_eq!(
            listed(&config),
            "account,balance\nandrej,998700\nbabayaga,2000\n"
        );
        assert_eq!(
            fs::read_to_string(config.log_path()).unwrap().lines().count(),
            2
        );
    }

    #[test]
    fn test_rejected_add_leaves_log_untouched() {
        let (_dir, config) = setup();

        let result = add_transaction(&config, Tx::new("babayaga", "andrej", 1, ""));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(config.log_path()).unwrap(), "");
    }
}
