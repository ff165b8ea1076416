//! Core aggregation and prediction logic for the palm plantation census
//! dashboard.
//! This crate is the single source of truth for census business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{Config, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::census::{CensusData, CensusOperation, CensusType};
pub use model::company::Company;
pub use model::role::{parse_role, AccessDenied, Permission, Role, RoleError};
pub use model::tree::{PalmTree, Productivity, TreeStatus};
pub use model::{timestamp_now, RecordValidationError};
pub use repo::memory_store::MemoryRecordStore;
pub use repo::record_store::{EnsuredCompany, RecordStore, RepoError, RepoResult};
pub use repo::sqlite_store::SqliteRecordStore;
pub use service::aggregation::{summarize_recent_census, CensusSummary};
pub use service::census_service::{CensusService, CensusServiceError, ServiceSettings};
pub use service::dashboard::{
    company_or_default, compose_dashboard, export_tree_locations, monitoring_overview,
    DashboardSummary, MonitoringOptions, MonitoringOverview, TreeLocation,
};
pub use service::health::{classify_tree_health, HealthPolicy, HealthStatus, HealthTier};
pub use service::prediction::{predict_yield, recommendations, PredictionConfig, YieldPrediction};
pub use service::seed::{seed_sample_data, seed_sample_data_with, SeedReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
