//! In-memory record store.
//!
//! Mirrors the SQLite store's ordering and uniqueness rules so services can
//! be exercised without a database. Single-threaded; not `Sync`.
//! Timestamps are truncated to milliseconds on insert, matching what SQLite
//! persists.

use crate::model::census::{CensusData, CensusOperation};
use crate::model::company::Company;
use crate::model::tree::{PalmTree, Productivity};
use crate::repo::record_store::{EnsuredCompany, RecordStore, RepoError, RepoResult};
use chrono::{DateTime, SubsecRound, Utc};
use std::cell::RefCell;

#[derive(Debug, Clone, Default)]
struct Tables {
    companies: Vec<Company>,
    operations: Vec<CensusOperation>,
    measurements: Vec<CensusData>,
    trees: Vec<PalmTree>,
}

/// `RecordStore` kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RefCell<Tables>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn company(&self) -> RepoResult<Option<Company>> {
        Ok(self.tables.borrow().companies.first().cloned())
    }

    fn ensure_company(&self, candidate: &Company) -> RepoResult<EnsuredCompany> {
        candidate.validate()?;
        let mut tables = self.tables.borrow_mut();
        let created = tables.companies.is_empty();
        if created {
            let mut company = candidate.clone();
            company.created_at = stored_time(company.created_at);
            tables.companies.push(company);
        }
        Ok(EnsuredCompany {
            company: tables.companies[0].clone(),
            created,
        })
    }

    fn count_companies(&self) -> RepoResult<u64> {
        Ok(self.tables.borrow().companies.len() as u64)
    }

    fn insert_operation(&self, operation: &CensusOperation) -> RepoResult<()> {
        operation.validate()?;
        let mut tables = self.tables.borrow_mut();
        if tables
            .operations
            .iter()
            .any(|existing| existing.operation_id == operation.operation_id)
        {
            return Err(RepoError::Conflict(format!(
                "`{}`: duplicate operation id",
                operation.operation_id
            )));
        }
        let mut operation = operation.clone();
        operation.date = stored_time(operation.date);
        operation.created_at = stored_time(operation.created_at);
        tables.operations.push(operation);
        Ok(())
    }

    fn recent_operations(&self, limit: u32) -> RepoResult<Vec<CensusOperation>> {
        let mut operations = self.tables.borrow().operations.clone();
        // Stable sort: equal dates stay in insertion order.
        operations.sort_by(|left, right| right.date.cmp(&left.date));
        operations.truncate(limit as usize);
        Ok(operations)
    }

    fn count_operations(&self) -> RepoResult<u64> {
        Ok(self.tables.borrow().operations.len() as u64)
    }

    fn insert_measurement(&self, data: &CensusData) -> RepoResult<()> {
        data.validate()?;
        let mut tables = self.tables.borrow_mut();
        if !tables
            .operations
            .iter()
            .any(|operation| operation.operation_id == data.operation_id)
        {
            return Err(RepoError::Conflict(format!(
                "`{}`: unknown operation id",
                data.operation_id
            )));
        }
        if tables
            .measurements
            .iter()
            .any(|existing| existing.operation_id == data.operation_id)
        {
            return Err(RepoError::Conflict(format!(
                "`{}`: operation already has a measurement",
                data.operation_id
            )));
        }
        let mut data = data.clone();
        data.created_at = stored_time(data.created_at);
        tables.measurements.push(data);
        Ok(())
    }

    fn measurement_for_operation(&self, operation_id: &str) -> RepoResult<Option<CensusData>> {
        Ok(self
            .tables
            .borrow()
            .measurements
            .iter()
            .find(|data| data.operation_id == operation_id)
            .cloned())
    }

    fn latest_measurement(&self) -> RepoResult<Option<CensusData>> {
        // `max_by_key` keeps the last maximum, i.e. the latest insert.
        Ok(self
            .tables
            .borrow()
            .measurements
            .iter()
            .max_by_key(|data| data.created_at)
            .cloned())
    }

    fn count_measurements(&self) -> RepoResult<u64> {
        Ok(self.tables.borrow().measurements.len() as u64)
    }

    fn insert_tree(&self, tree: &PalmTree) -> RepoResult<()> {
        tree.validate()?;
        let mut tables = self.tables.borrow_mut();
        if tables
            .trees
            .iter()
            .any(|existing| existing.tree_id == tree.tree_id)
        {
            return Err(RepoError::Conflict(format!(
                "`{}`: duplicate tree id",
                tree.tree_id
            )));
        }
        let mut tree = tree.clone();
        tree.last_census_date = tree.last_census_date.map(stored_time);
        tree.created_at = stored_time(tree.created_at);
        tables.trees.push(tree);
        Ok(())
    }

    fn list_trees(&self) -> RepoResult<Vec<PalmTree>> {
        Ok(self.tables.borrow().trees.clone())
    }

    fn count_trees(&self, productivity: Option<Productivity>) -> RepoResult<u64> {
        let tables = self.tables.borrow();
        let count = match productivity {
            Some(productivity) => tables
                .trees
                .iter()
                .filter(|tree| tree.productivity == productivity)
                .count(),
            None => tables.trees.len(),
        };
        Ok(count as u64)
    }

    fn in_exclusive_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let snapshot = self.tables.borrow().clone();
        let result = work(self);
        if result.is_err() {
            *self.tables.borrow_mut() = snapshot;
        }
        result
    }
}

fn stored_time(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}
