//! Point transfers
//!
//! The core of the service: validation, atomic debit/credit with matching
//! ledger entries, idempotent retries, paginated history.

pub mod api;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod store;


pub use error::TransferError;
pub use models::{NewTransfer, Transfer, TransferRequest, TransferStatus};
pub use orchestrator::TransferOrchestrator;
pub use store::{SqliteTransferStore, TransferStore};
