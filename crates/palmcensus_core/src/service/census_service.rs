//! Role-gated facade over the census use-cases.

use crate::model::role::{AccessDenied, Permission, Role};
use crate::repo::record_store::{RecordStore, RepoError};
use crate::service::aggregation::{summarize_recent_census, CensusSummary, DEFAULT_RECENT_LIMIT};
use crate::service::dashboard::{
    compose_dashboard, export_tree_locations, monitoring_overview, DashboardSummary,
    MonitoringOptions, MonitoringOverview, TreeLocation, DEFAULT_MONITORING_OPERATIONS,
};
use crate::service::health::HealthPolicy;
use crate::service::prediction::PredictionConfig;
use crate::service::seed::{seed_sample_data, SeedReport};
use log::warn;
use thiserror::Error;

/// Failure of a role-gated use-case.
#[derive(Debug, Error)]
pub enum CensusServiceError {
    /// The acting role lacks the required permission.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    /// The record store failed.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Tunables applied by `CensusService`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub summary_limit: u32,
    pub operations_limit: u32,
    pub prediction: PredictionConfig,
    pub health: HealthPolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            summary_limit: DEFAULT_RECENT_LIMIT,
            operations_limit: DEFAULT_MONITORING_OPERATIONS,
            prediction: PredictionConfig::default(),
            health: HealthPolicy::default(),
        }
    }
}

/// Entry point for presentation layers. Every call names the acting role.
pub struct CensusService<S: RecordStore> {
    store: S,
    settings: ServiceSettings,
}

impl<S: RecordStore> CensusService<S> {
    /// Creates a service using the provided store and default settings.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, ServiceSettings::default())
    }

    /// Creates a service using the provided store and settings.
    pub fn with_settings(store: S, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    /// Settings this service was built with.
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Company profile, tree totals and latest measurement.
    pub fn dashboard(&self, role: Role) -> Result<DashboardSummary, CensusServiceError> {
        authorize(role, Permission::ViewDashboard)?;
        Ok(compose_dashboard(&self.store)?)
    }

    /// Summary over `limit` operations, or the configured default.
    pub fn census_summary(
        &self,
        role: Role,
        limit: Option<u32>,
    ) -> Result<CensusSummary, CensusServiceError> {
        authorize(role, Permission::ViewDashboard)?;
        let limit = limit.unwrap_or(self.settings.summary_limit);
        Ok(summarize_recent_census(&self.store, limit)?)
    }

    /// Yield projection, health tiers, recommendations and recent operations.
    pub fn monitoring(&self, role: Role) -> Result<MonitoringOverview, CensusServiceError> {
        authorize(role, Permission::ViewMonitoring)?;
        let options = MonitoringOptions {
            summary_limit: self.settings.summary_limit,
            operations_limit: self.settings.operations_limit,
            prediction: self.settings.prediction,
            health: self.settings.health,
        };
        Ok(monitoring_overview(&self.store, &options)?)
    }

    /// Map-ready tree locations. Requires `ExportTreeLocations`.
    pub fn tree_locations(&self, role: Role) -> Result<Vec<TreeLocation>, CensusServiceError> {
        authorize(role, Permission::ExportTreeLocations)?;
        Ok(export_tree_locations(&self.store)?)
    }

    /// Seeds demonstration data into empty collections. Requires `SeedSampleData`.
    pub fn seed_sample_data(&self, role: Role) -> Result<SeedReport, CensusServiceError> {
        authorize(role, Permission::SeedSampleData)?;
        Ok(seed_sample_data(&self.store)?)
    }
}

fn authorize(role: Role, permission: Permission) -> Result<(), AccessDenied> {
    role.ensure(permission).inspect_err(|_| {
        warn!(
            "event=access_denied module=service status=error role={} permission={}",
            role, permission
        );
    })
}
