use crate::{
    error::{LedgerError, Result},
    genesis::load_genesis,
    transaction::{Account, Tx},
};
use std::{
    collections::{HashMap, VecDeque},
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Live ledger: balances, pending transactions and the append-only log they flush to
#[derive(Debug)]
pub struct State {
    balances: HashMap<Account, u64>,
    tx_mempool: VecDeque<Tx>,
    db_file: File,
    db_path: PathBuf,
}

impl State {
    /// Rebuilds balances from the genesis allocation plus every logged transaction, in file order.
    ///
    /// The log is created if it does not exist yet. A logged transaction that fails validation
    /// means the log was tampered with and aborts startup.
    pub fn new_from_disk(genesis_path: impl AsRef<Path>, log_path: impl AsRef<Path>) -> Result<Self> {
        let genesis = load_genesis(genesis_path)?;
        let mut balances = genesis.balances;

        let db_path = log_path.as_ref().to_path_buf();
        let db_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&db_path)
            .map_err(|e| LedgerError::io(&db_path, e))?;

        let replayed = replay(&db_file, &db_path, &mut balances)?;

        info!(
            "Replayed {replayed} transactions from {}, {} accounts",
            db_path.display(),
            balances.len()
        );

        Ok(Self {
            balances,
            tx_mempool: VecDeque::new(),
            db_file,
            db_path,
        })
    }

    /// Validates and applies `tx`, queueing it for the next [`State::persist`]
    pub fn add(&mut self, tx: Tx) -> Result<()> {
        if let Err(e) = apply(&mut self.balances, &tx) {
            warn!("Rejected transaction {} -> {}: {e}", tx.from, tx.to);

            return Err(e);
        }

        self.tx_mempool.push_back(tx);

        Ok(())
    }

    /// Appends pending transactions to the log in FIFO order.
    ///
    /// Each transaction leaves the mempool only once its record is written. A failed write is
    /// cut back to the last complete record and keeps the unwritten tail queued for the next call.
    pub fn persist(&mut self) -> Result<()> {
        let written = write_pending(&mut self.db_file, &self.db_path, &mut self.tx_mempool)?;

        if written > 0 {
            self.db_file
                .sync_data()
                .map_err(|e| LedgerError::io(&self.db_path, e))?;

            info!("Persisted {written} transactions to {}", self.db_path.display());
        }

        Ok(())
    }

    /// Flushes the log to disk and releases it. Pending transactions that were never
    /// persisted are dropped.
    pub fn close(self) -> Result<()> {
        if !self.tx_mempool.is_empty() {
            warn!(
                "Closing with {} unpersisted transactions",
                self.tx_mempool.len()
            );
        }

        self.db_file
            .sync_all()
            .map_err(|e| LedgerError::io(&self.db_path, e))
    }

    pub const fn balances(&self) -> &HashMap<Account, u64> {
        &self.balances
    }

    /// Unknown accounts hold nothing
    pub fn balance(&self, account: &Account) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Tx> {
        self.tx_mempool.iter()
    }
}

/// Append target for log records that can cut off a partially written record
trait LogWriter: Write {
    fn end(&mut self) -> io::Result<u64>;

    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogWriter for File {
    fn end(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes queued transactions front to back, popping each one only after its record is
/// fully written. A failed write is rolled back to the record boundary.
fn write_pending<W: LogWriter>(
    out: &mut W,
    path: &Path,
    mempool: &mut VecDeque<Tx>,
) -> Result<usize> {
    let mut written = 0;

    while let Some(tx) = mempool.front() {
        let mut record = serde_json::to_vec(tx)?;
        record.push(b'\n');

        let start = out.end().map_err(|e| LedgerError::io(path, e))?;

        if let Err(e) = out.write_all(&record) {
            if let Err(rollback) = out.truncate(start) {
                warn!("Failed to roll back partial record in {}: {rollback}", path.display());
            }

            return Err(LedgerError::io(path, e));
        }

        debug!("Persisted transaction {} -> {} ({})", tx.from, tx.to, tx.value);
        mempool.pop_front();
        written += 1;
    }

    Ok(written)
}

fn replay(db_file: &File, db_path: &Path, balances: &mut HashMap<Account, u64>) -> Result<usize> {
    let reader = BufReader::new(db_file);
    let mut replayed = 0;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(|e| LedgerError::io(db_path, e))?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);

        let tx: Tx = serde_json::from_slice(line).map_err(|source| LedgerError::Format {
            path: db_path.to_path_buf(),
            line: index + 1,
            source,
        })?;

        apply(balances, &tx)?;

        debug!("Replayed transaction {} -> {} ({})", tx.from, tx.to, tx.value);
        replayed += 1;
    }

    Ok(replayed)
}

/// Checks `tx` against current balances and applies it. Balances are only written once
/// every check has passed.
fn apply(balances: &mut HashMap<Account, u64>, tx: &Tx) -> Result<()> {
    let held = |account: &Account| balances.get(account).copied().unwrap_or(0);

    if tx.is_reward() {
        let balance = held(&tx.to);
        let credited = balance
            .checked_add(tx.value)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account: tx.to.clone(),
                balance,
                value: tx.value,
            })?;

        balances.insert(tx.to.clone(), credited);

        return Ok(());
    }

    let balance = held(&tx.from);
    if balance < tx.value {
        return Err(LedgerError::InsufficientBalance {
            account: tx.from.clone(),
            balance,
            value: tx.value,
        });
    }

    let debited = balance - tx.value;
    let receiver = if tx.from == tx.to {
        debited
    } else {
        held(&tx.to)
    };
    let credited = receiver
        .checked_add(tx.value)
        .ok_or_else(|| LedgerError::BalanceOverflow {
            account: tx.to.clone(),
            balance: receiver,
            value: tx.value,
        })?;

    balances.insert(tx.from.clone(), debited);
    balances.insert(tx.to.clone(), credited);

    Ok(())
}
