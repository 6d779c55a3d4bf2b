//! Point ledger
//!
//! Append-only record of every balance change, and the balance resolver that
//! derives a member's current balance from it.

pub mod balance;
pub mod models;
pub mod store;

pub use balance::{BalanceError, BalanceResolver};
pub use models::{EventKind, LedgerEntry, NewLedgerEntry};
pub use store::{LedgerStore, SqliteLedgerStore};
