//! Member account management
//!
//! SQLite-backed storage for member profiles, plus the account directory
//! capability the transfer core depends on.

pub mod api;
pub mod directory;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use directory::{AccountDirectory, SqliteAccountDirectory};
pub use models::{Member, MemberProfile};
pub use repository::MemberRepository;
