//! Physical palm tree records.

use crate::model::{require_text, RecordValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field status of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    Active,
    Inactive,
    Diseased,
}

impl TreeStatus {
    /// Persisted lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Diseased => "diseased",
        }
    }

    /// Parses a persisted label; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "diseased" => Some(Self::Diseased),
            _ => None,
        }
    }
}

/// Binary fruit-productivity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Productivity {
    Productive,
    Unproductive,
}

impl Productivity {
    /// Persisted lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Unproductive => "unproductive",
        }
    }

    /// Parses a persisted label; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "productive" => Some(Self::Productive),
            "unproductive" => Some(Self::Unproductive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalmTree {
    pub tree_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: TreeStatus,
    pub productivity: Productivity,
    /// Within `[0.0, 1.0]`; higher is healthier.
    pub health_score: f64,
    pub last_census_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PalmTree {
    /// Checks identifier, coordinate and health-score ranges.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("palm_tree", "tree_id", &self.tree_id)?;
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(RecordValidationError::InvalidCoordinate {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(RecordValidationError::InvalidCoordinate {
                field: "longitude",
                value: self.longitude,
            });
        }
        if !(0.0..=1.0).contains(&self.health_score) {
            return Err(RecordValidationError::HealthScoreOutOfRange(
                self.health_score,
            ));
        }
        Ok(())
    }
}
