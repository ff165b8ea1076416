//! Plantation company profile.

use crate::model::{require_area, require_text, timestamp_now, RecordValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Profile synthesized when no company is stored.
pub const DEFAULT_COMPANY_NAME: &str = "PT Sawit Mandiri";
pub const DEFAULT_COMPANY_AREA_HECTARES: f64 = 1250.5;
pub const DEFAULT_COMPANY_LOCATION: &str = "Cikijang, Sukabumi, Jawa Barat";

/// Singleton-per-deployment plantation profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub area_hectares: f64,
    pub location: Option<String>,
    pub established_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Profile synthesized when the dashboard is opened on an empty store.
    pub fn default_profile() -> Self {
        Self {
            name: DEFAULT_COMPANY_NAME.to_string(),
            area_hectares: DEFAULT_COMPANY_AREA_HECTARES,
            location: Some(DEFAULT_COMPANY_LOCATION.to_string()),
            established_date: None,
            created_at: timestamp_now(),
        }
    }

    /// Default profile plus the founding date used by demonstration seeds.
    pub fn sample_profile() -> Self {
        Self {
            established_date: NaiveDate::from_ymd_opt(2010, 1, 1),
            ..Self::default_profile()
        }
    }

    /// Checks the name and area invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("company", "name", &self.name)?;
        require_area("company", "area_hectares", self.area_hectares)
    }
}
