//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the read/write operations the aggregation layer needs over the
//!   four census record collections.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes validate records before persistence.
//! - Reads reject invalid persisted state instead of masking it.
//! - Uniqueness conflicts surface as `RepoError::Conflict` from every
//!   implementation.

pub mod memory_store;
pub mod record_store;
pub mod sqlite_store;
