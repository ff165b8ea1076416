//! Demonstration seed data.
//!
//! # Responsibility
//! - Populate an empty store with one company, 100 trees and 10 census
//!   operations with measurements.
//!
//! # Invariants
//! - Each population is skipped when any record of its kind exists, so a
//!   second call is a no-op.
//! - The whole seed runs in one exclusive store transaction.
//! - Values are random and carry no contract beyond record validity.

use crate::model::census::{CensusData, CensusOperation, CensusType};
use crate::model::company::Company;
use crate::model::timestamp_now;
use crate::model::tree::{PalmTree, Productivity, TreeStatus};
use crate::repo::record_store::{RecordStore, RepoResult};
use chrono::{DateTime, Duration, Utc};
use log::info;
use rand::Rng;
use serde::Serialize;
use std::time::Instant;

pub const SAMPLE_TREE_COUNT: u32 = 100;
pub const SAMPLE_OPERATION_COUNT: u32 = 10;
/// Cikijang, Sukabumi.
pub const SAMPLE_BASE_POINT: (f64, f64) = (-6.8447, 106.9317);
pub const SAMPLE_JITTER_DEGREES: f64 = 0.1;

const TREE_ID_OFFSET: u32 = 1000;
const OPERATION_SEQ_OFFSET: u32 = 100;
const STATUS_POOL: [TreeStatus; 4] = [
    TreeStatus::Active,
    TreeStatus::Active,
    TreeStatus::Active,
    TreeStatus::Inactive,
];
const PRODUCTIVITY_POOL: [Productivity; 3] = [
    Productivity::Productive,
    Productivity::Productive,
    Productivity::Unproductive,
];

/// What a seed call inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub company_created: bool,
    pub trees_inserted: u32,
    pub operations_inserted: u32,
    pub measurements_inserted: u32,
}

impl SeedReport {
    /// True when every collection was already populated.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Seeds the store using the thread-local RNG.
pub fn seed_sample_data<S: RecordStore>(store: &S) -> RepoResult<SeedReport> {
    seed_sample_data_with(store, &mut rand::rng())
}

/// Seeds the store drawing values from `rng`.
pub fn seed_sample_data_with<S: RecordStore, R: Rng>(
    store: &S,
    rng: &mut R,
) -> RepoResult<SeedReport> {
    let started_at = Instant::now();
    info!("event=seed_sample_data module=seed status=start");

    let report = store.in_exclusive_transaction(|store| {
        let now = timestamp_now();
        let mut report = SeedReport::default();

        if store.count_companies()? == 0 {
            report.company_created = store.ensure_company(&Company::sample_profile())?.created;
        }

        if store.count_trees(None)? == 0 {
            for index in 0..SAMPLE_TREE_COUNT {
                store.insert_tree(&sample_tree(rng, index, now))?;
                report.trees_inserted += 1;
            }
        }

        if store.count_operations()? == 0 {
            let operations: Vec<CensusOperation> = (0..SAMPLE_OPERATION_COUNT)
                .map(|index| sample_operation(rng, index, now))
                .collect();
            for operation in &operations {
                store.insert_operation(operation)?;
                report.operations_inserted += 1;
            }
            for operation in &operations {
                store.insert_measurement(&sample_measurement(rng, &operation.operation_id, now))?;
                report.measurements_inserted += 1;
            }
        }

        Ok(report)
    })?;

    info!(
        "event=seed_sample_data module=seed status=ok company_created={} trees={} operations={} measurements={} duration_ms={}",
        report.company_created,
        report.trees_inserted,
        report.operations_inserted,
        report.measurements_inserted,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn sample_tree<R: Rng>(rng: &mut R, index: u32, now: DateTime<Utc>) -> PalmTree {
    let (base_lat, base_lng) = SAMPLE_BASE_POINT;
    PalmTree {
        tree_id: format!("TREE-{}", TREE_ID_OFFSET + index),
        latitude: base_lat + rng.random_range(-SAMPLE_JITTER_DEGREES..=SAMPLE_JITTER_DEGREES),
        longitude: base_lng + rng.random_range(-SAMPLE_JITTER_DEGREES..=SAMPLE_JITTER_DEGREES),
        status: STATUS_POOL[rng.random_range(0..STATUS_POOL.len())],
        productivity: PRODUCTIVITY_POOL[rng.random_range(0..PRODUCTIVITY_POOL.len())],
        health_score: rng.random_range(0.3..1.0),
        last_census_date: Some(now - Duration::days(rng.random_range(1..=30))),
        created_at: now,
    }
}

fn sample_operation<R: Rng>(rng: &mut R, index: u32, now: DateTime<Utc>) -> CensusOperation {
    // Blocks are lettered A, B, C, ... by day offset.
    let block = char::from(b'A' + index as u8);
    CensusOperation {
        operation_id: format!(
            "OP-{}-{}",
            now.format("%Y%m%d"),
            OPERATION_SEQ_OFFSET + index
        ),
        date: now - Duration::days(i64::from(index)),
        entity: format!("Blok {block}"),
        census_type: CensusType::FlowerAndFruit,
        tree_image_url: None,
        hectare_covered: rng.random_range(10.0..50.0),
        prediction_result: Some(format!(
            "Prediksi hasil: {} ton",
            rng.random_range(80..=120u32)
        )),
        action_recommendation: Some("Lanjutkan monitoring rutin".to_string()),
        created_at: now,
    }
}

fn sample_measurement<R: Rng>(rng: &mut R, operation_id: &str, now: DateTime<Utc>) -> CensusData {
    CensusData {
        operation_id: operation_id.to_string(),
        male_flower: rng.random_range(50..=200),
        female_flower: rng.random_range(30..=150),
        purse_flower: rng.random_range(20..=100),
        red_fruit: rng.random_range(100..=300),
        black_fruit: rng.random_range(80..=250),
        total_palm_trees: rng.random_range(200..=500),
        productive_trees: rng.random_range(150..=400),
        unproductive_trees: rng.random_range(20..=100),
        land_area_census: rng.random_range(10.0..50.0),
        created_at: now,
    }
}
