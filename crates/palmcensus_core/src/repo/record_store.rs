//! Record store trait shared by SQLite and in-memory backends.

use crate::db::DbError;
use crate::model::census::{CensusData, CensusOperation};
use crate::model::company::Company;
use crate::model::tree::{PalmTree, Productivity};
use crate::model::RecordValidationError;
use thiserror::Error;

/// Result type for record store operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level failure. Services propagate it unchanged.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] RecordValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("record conflict: {0}")]
    Conflict(String),
    #[error("invalid persisted census data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a create-if-absent company write.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsuredCompany {
    /// The authoritative stored company.
    pub company: Company,
    /// Whether this call inserted it.
    pub created: bool,
}

/// Read/write operations over companies, census operations, measurements
/// and palm trees.
pub trait RecordStore {
    /// Returns the authoritative company, if any.
    fn company(&self) -> RepoResult<Option<Company>>;
    /// Inserts `candidate` unless a company exists, then returns the stored
    /// one. Concurrent callers observe exactly one row.
    fn ensure_company(&self, candidate: &Company) -> RepoResult<EnsuredCompany>;
    /// Number of stored company rows (0 or 1).
    fn count_companies(&self) -> RepoResult<u64>;

    /// Validates and inserts an operation; duplicate ids are a `Conflict`.
    fn insert_operation(&self, operation: &CensusOperation) -> RepoResult<()>;
    /// Up to `limit` operations by `date` descending; equal dates keep
    /// insertion order.
    fn recent_operations(&self, limit: u32) -> RepoResult<Vec<CensusOperation>>;
    /// Number of stored census operations.
    fn count_operations(&self) -> RepoResult<u64>;

    /// Fails with `Conflict` when the operation is unknown or already has a
    /// measurement.
    fn insert_measurement(&self, data: &CensusData) -> RepoResult<()>;
    /// Measurement joined to `operation_id`, if recorded.
    fn measurement_for_operation(&self, operation_id: &str) -> RepoResult<Option<CensusData>>;
    /// Most recently created measurement; the later insert wins ties.
    fn latest_measurement(&self) -> RepoResult<Option<CensusData>>;
    /// Number of stored measurements.
    fn count_measurements(&self) -> RepoResult<u64>;

    /// Validates and inserts a tree; duplicate ids are a `Conflict`.
    fn insert_tree(&self, tree: &PalmTree) -> RepoResult<()>;
    /// All trees in insertion order.
    fn list_trees(&self) -> RepoResult<Vec<PalmTree>>;
    /// Tree count, optionally filtered by productivity.
    fn count_trees(&self, productivity: Option<Productivity>) -> RepoResult<u64>;

    /// Runs `work` so that no other writer interleaves; all writes made by
    /// `work` are discarded when it fails.
    fn in_exclusive_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>;
}
