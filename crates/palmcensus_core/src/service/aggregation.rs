//! Recent census aggregation.
//!
//! # Invariants
//! - Only the `min(limit, available)` most recent operations contribute.
//! - An operation without a measurement adds zero but is still counted.

use crate::model::census::CensusData;
use crate::repo::record_store::{RecordStore, RepoResult};
use log::debug;
use serde::Serialize;
use std::time::Instant;

/// Number of operations the dashboard aggregates by default.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

/// Summed counts over recent census operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CensusSummary {
    pub male_flower: u64,
    pub female_flower: u64,
    pub purse_flower: u64,
    pub red_fruit: u64,
    pub black_fruit: u64,
    pub land_area_census: f64,
    /// Operations considered, with or without a measurement.
    pub operations_count: u64,
}

impl CensusSummary {
    fn absorb(&mut self, data: &CensusData) {
        self.male_flower += u64::from(data.male_flower);
        self.female_flower += u64::from(data.female_flower);
        self.purse_flower += u64::from(data.purse_flower);
        self.red_fruit += u64::from(data.red_fruit);
        self.black_fruit += u64::from(data.black_fruit);
        self.land_area_census += data.land_area_census;
    }
}

/// Sums measurement counts over the `limit` most recent operations.
pub fn summarize_recent_census<S: RecordStore>(store: &S, limit: u32) -> RepoResult<CensusSummary> {
    let started_at = Instant::now();
    let operations = store.recent_operations(limit)?;

    let mut summary = CensusSummary {
        operations_count: operations.len() as u64,
        ..CensusSummary::default()
    };
    let mut missing = 0usize;
    for operation in &operations {
        match store.measurement_for_operation(&operation.operation_id)? {
            Some(data) => summary.absorb(&data),
            None => missing += 1,
        }
    }

    debug!(
        "event=census_summary module=service status=ok limit={} operations={} missing_measurements={} duration_ms={}",
        limit,
        summary.operations_count,
        missing,
        started_at.elapsed().as_millis()
    );
    Ok(summary)
}
