//! points_ledger - Membership Points Transfer Service
//!
//! Moves points between member accounts and records every balance change as
//! an immutable ledger entry, so a balance is always reconstructible from its
//! history.
//!
//! # Modules
//!
//! - [`member`] - Member profiles and the account directory
//! - [`ledger`] - Append-only point ledger and balance derivation
//! - [`transfer`] - Transfer orchestration (the core)
//! - [`db`] - SQLite pool and schema management
//! - [`server`] - axum router assembly
//! - [`config`] / [`logging`] - runtime configuration and tracing setup

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod member;
pub mod server;
pub mod transfer;

// Convenient re-exports at crate root
pub use db::Database;
pub use ledger::{BalanceResolver, EventKind, LedgerEntry, LedgerStore, SqliteLedgerStore};
pub use member::{AccountDirectory, Member, MemberRepository, SqliteAccountDirectory};
pub use transfer::{
    SqliteTransferStore, Transfer, TransferError, TransferOrchestrator, TransferRequest,
    TransferStatus, TransferStore,
};
