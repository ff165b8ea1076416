//! Landing-page and monitoring-page composition.
//!
//! # Responsibility
//! - Build the dashboard summary, creating the default company on first use.
//! - Bundle prediction, health and recommendations for the monitoring page.
//! - Export tree locations for the map layer.
//!
//! # Invariants
//! - `productive_trees + unproductive_trees == total_trees`.
//! - Default-company creation is the only write and goes through
//!   `RecordStore::ensure_company`.

use crate::model::census::{CensusData, CensusOperation};
use crate::model::company::Company;
use crate::model::tree::{PalmTree, Productivity, TreeStatus};
use crate::repo::record_store::{RecordStore, RepoResult};
use crate::service::aggregation::summarize_recent_census;
use crate::service::health::{classify_tree_health, HealthPolicy, HealthStatus};
use crate::service::prediction::{predict_yield, recommendations, PredictionConfig, YieldPrediction};
use log::{debug, info};
use serde::Serialize;
use std::time::Instant;

/// Operations listed on the monitoring page by default.
pub const DEFAULT_MONITORING_OPERATIONS: u32 = 10;

/// Landing-page view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub company: Company,
    pub total_trees: u64,
    pub productive_trees: u64,
    pub unproductive_trees: u64,
    /// Most recently created measurement, `None` on an empty store.
    pub latest_census: Option<CensusData>,
}

/// Monitoring-page view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringOverview {
    pub predictions: YieldPrediction,
    pub health_status: HealthStatus,
    pub recommendations: Vec<String>,
    pub recent_operations: Vec<CensusOperation>,
}

/// Inputs of the monitoring view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitoringOptions {
    pub summary_limit: u32,
    pub operations_limit: u32,
    pub prediction: PredictionConfig,
    pub health: HealthPolicy,
}

/// Map marker for one tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLocation {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub status: TreeStatus,
    pub productivity: Productivity,
    pub health_score: f64,
    /// RFC 3339 timestamp.
    pub last_census: Option<String>,
}

impl From<&PalmTree> for TreeLocation {
    fn from(tree: &PalmTree) -> Self {
        Self {
            id: tree.tree_id.clone(),
            lat: tree.latitude,
            lng: tree.longitude,
            status: tree.status,
            productivity: tree.productivity,
            health_score: tree.health_score,
            last_census: tree.last_census_date.map(|date| date.to_rfc3339()),
        }
    }
}

/// Returns the stored company, inserting the default profile when absent.
pub fn company_or_default<S: RecordStore>(store: &S) -> RepoResult<Company> {
    if let Some(company) = store.company()? {
        return Ok(company);
    }

    let ensured = store.ensure_company(&Company::default_profile())?;
    if ensured.created {
        info!("event=default_company module=service status=created");
    }
    Ok(ensured.company)
}

/// Composes the landing-page summary.
pub fn compose_dashboard<S: RecordStore>(store: &S) -> RepoResult<DashboardSummary> {
    let started_at = Instant::now();
    let company = company_or_default(store)?;

    let total_trees = store.count_trees(None)?;
    // Clamped so a tree inserted between the two counts cannot break the sum.
    let productive_trees = store
        .count_trees(Some(Productivity::Productive))?
        .min(total_trees);
    let latest_census = store.latest_measurement()?;

    debug!(
        "event=dashboard_compose module=service status=ok total_trees={} has_latest={} duration_ms={}",
        total_trees,
        latest_census.is_some(),
        started_at.elapsed().as_millis()
    );
    Ok(DashboardSummary {
        company,
        total_trees,
        productive_trees,
        unproductive_trees: total_trees - productive_trees,
        latest_census,
    })
}

/// Composes the monitoring page: projection, health tiers, advice and the
/// latest operations.
pub fn monitoring_overview<S: RecordStore>(
    store: &S,
    options: &MonitoringOptions,
) -> RepoResult<MonitoringOverview> {
    let summary = summarize_recent_census(store, options.summary_limit)?;
    Ok(MonitoringOverview {
        predictions: predict_yield(&summary, &options.prediction),
        health_status: classify_tree_health(store, &options.health)?,
        recommendations: recommendations(),
        recent_operations: store.recent_operations(options.operations_limit)?,
    })
}

/// Lists every tree as a map marker.
pub fn export_tree_locations<S: RecordStore>(store: &S) -> RepoResult<Vec<TreeLocation>> {
    Ok(store.list_trees()?.iter().map(TreeLocation::from).collect())
}
