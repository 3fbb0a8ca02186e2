pub mod error;
pub mod genesis;
pub mod state;
pub mod transaction;

pub use error::{LedgerError, Result};
pub use genesis::{load_genesis, Genesis};
pub use state::State;
pub use transaction::{Account, Tx};
