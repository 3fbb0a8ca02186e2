use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const GENESIS_FILE: &str = "genesis.json";
const LOG_FILE: &str = "tx.db";

/// Trait for reading configuration parameters
pub trait Config {
    fn data_dir(&self) -> &Path;

    fn genesis_path(&self) -> PathBuf {
        self.data_dir().join(GENESIS_FILE)
    }

    fn log_path(&self) -> PathBuf {
        self.data_dir().join(LOG_FILE)
    }
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "tbb",
    about = "A minimal ledger replaying a genesis allocation and an append-only transaction log",
    version
)]
pub struct CliConfig {
    /// Directory holding genesis.json and the tx.db transaction log
    #[arg(long, value_name = "DIR", default_value = "database", global = true)]
    datadir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interact with balances
    #[command(subcommand)]
    Balances(BalancesCommand),
    /// Interact with transactions
    #[command(subcommand)]
    Tx(TxCommand),
}

#[derive(Subcommand, Debug)]
pub enum BalancesCommand {
    /// List all balances
    List,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// Add a transaction to the ledger
    Add {
        /// Account to send the value from
        #[arg(long, default_value = "")]
        from: String,
        /// Account to send the value to
        #[arg(long)]
        to: String,
        /// Value to send
        #[arg(long)]
        value: u64,
        /// Data marker, "reward" mints the value into the receiver
        #[arg(long, default_value = "")]
        data: String,
    },
}

impl Config for CliConfig {
    fn data_dir(&self) -> &Path {
        &self.datadir
    }
}
