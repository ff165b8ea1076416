//! Tree health tiering.
//!
//! # Invariants
//! - Tiers are half-open: `[0, warning)`, `[warning, healthy)`,
//!   `[healthy, 1]`. A score on a boundary belongs to the higher tier.
//! - `healthy + warning + critical == total_trees`.

use crate::repo::record_store::{RecordStore, RepoResult};
use log::debug;
use serde::{Deserialize, Serialize};

/// Score thresholds separating the three tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPolicy {
    /// Lowest score classified as warning.
    pub warning_threshold: f64,
    /// Lowest score classified as healthy.
    pub healthy_threshold: f64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            warning_threshold: 0.4,
            healthy_threshold: 0.7,
        }
    }
}

/// Tier a single health score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthPolicy {
    /// Boundary scores belong to the higher tier.
    pub fn classify(&self, health_score: f64) -> HealthTier {
        if health_score >= self.healthy_threshold {
            HealthTier::Healthy
        } else if health_score >= self.warning_threshold {
            HealthTier::Warning
        } else {
            HealthTier::Critical
        }
    }
}

/// Tree counts per health tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub total_trees: u64,
    pub healthy: u64,
    pub warning: u64,
    pub critical: u64,
}

impl HealthStatus {
    /// Buckets an arbitrary sequence of scores.
    pub fn from_scores(policy: &HealthPolicy, scores: impl IntoIterator<Item = f64>) -> Self {
        let mut status = Self::default();
        for score in scores {
            status.total_trees += 1;
            match policy.classify(score) {
                HealthTier::Healthy => status.healthy += 1,
                HealthTier::Warning => status.warning += 1,
                HealthTier::Critical => status.critical += 1,
            }
        }
        status
    }
}

/// Scans every tree in the store and counts it into one tier.
pub fn classify_tree_health<S: RecordStore>(
    store: &S,
    policy: &HealthPolicy,
) -> RepoResult<HealthStatus> {
    let trees = store.list_trees()?;
    let status = HealthStatus::from_scores(policy, trees.iter().map(|tree| tree.health_score));
    debug!(
        "event=tree_health module=service status=ok total={} healthy={} warning={} critical={}",
        status.total_trees, status.healthy, status.warning, status.critical
    );
    Ok(status)
}
