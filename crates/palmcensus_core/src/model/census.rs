//! Census operations and their measurement records.
//!
//! # Invariants
//! - `CensusOperation::operation_id` is unique and is the join key into
//!   `CensusData`.
//! - At most one `CensusData` exists per operation id.

use crate::model::{require_area, require_text, RecordValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of field visit recorded by a census operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensusType {
    /// Flower and fruit counting visit.
    FlowerAndFruit,
    /// Tree inventory visit.
    Tree,
}

impl CensusType {
    /// Persisted label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlowerAndFruit => "oil palm flower & fruit",
            Self::Tree => "oil palm tree",
        }
    }

    /// Parses a persisted label; `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "oil palm flower & fruit" => Some(Self::FlowerAndFruit),
            "oil palm tree" => Some(Self::Tree),
            _ => None,
        }
    }
}

/// One field data-collection event for a plantation block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusOperation {
    pub operation_id: String,
    /// Visit time; recency ordering key.
    pub date: DateTime<Utc>,
    /// Block name, e.g. `Blok A`.
    pub entity: String,
    pub census_type: CensusType,
    pub tree_image_url: Option<String>,
    pub hectare_covered: f64,
    pub prediction_result: Option<String>,
    pub action_recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CensusOperation {
    /// Checks identifier, entity and area invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("census_operation", "operation_id", &self.operation_id)?;
        require_text("census_operation", "entity", &self.entity)?;
        require_area("census_operation", "hectare_covered", self.hectare_covered)
    }
}

/// Quantitative counts captured by one census operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusData {
    pub operation_id: String,
    pub male_flower: u32,
    pub female_flower: u32,
    pub purse_flower: u32,
    pub red_fruit: u32,
    pub black_fruit: u32,
    pub total_palm_trees: u32,
    pub productive_trees: u32,
    pub unproductive_trees: u32,
    pub land_area_census: f64,
    pub created_at: DateTime<Utc>,
}

impl CensusData {
    /// Zero-valued measurement for `operation_id`.
    pub fn empty(operation_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            operation_id: operation_id.into(),
            male_flower: 0,
            female_flower: 0,
            purse_flower: 0,
            red_fruit: 0,
            black_fruit: 0,
            total_palm_trees: 0,
            productive_trees: 0,
            unproductive_trees: 0,
            land_area_census: 0.0,
            created_at,
        }
    }

    /// Checks the join key and land area.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("census_data", "operation_id", &self.operation_id)?;
        require_area("census_data", "land_area_census", self.land_area_census)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timestamp_now;

    #[test]
    fn census_type_labels_round_trip() {
        for kind in [CensusType::FlowerAndFruit, CensusType::Tree] {
            assert_eq!(CensusType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CensusType::parse("palm"), None);
    }

    #[test]
    fn measurement_rejects_non_finite_area() {
        let mut data = CensusData::empty("OP-1", timestamp_now());
        assert!(data.validate().is_ok());
        data.land_area_census = f64::NAN;
        assert!(matches!(
            data.validate(),
            Err(RecordValidationError::InvalidArea {
                field: "land_area_census",
                ..
            })
        ));
    }

    #[test]
    fn operation_requires_identifier() {
        let operation = CensusOperation {
            operation_id: String::new(),
            date: timestamp_now(),
            entity: "Blok A".to_string(),
            census_type: CensusType::FlowerAndFruit,
            tree_image_url: None,
            hectare_covered: 12.0,
            prediction_result: None,
            action_recommendation: None,
            created_at: timestamp_now(),
        };
        assert_eq!(
            operation.validate(),
            Err(RecordValidationError::EmptyField {
                record: "census_operation",
                field: "operation_id",
            })
        );
    }
}
