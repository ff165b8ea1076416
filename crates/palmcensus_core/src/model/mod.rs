//! Plantation census domain model.
//!
//! # Responsibility
//! - Define the four persisted record types read by the aggregation layer.
//! - Define actor roles and the permissions they grant.
//! - Validate record invariants shared by every store implementation.
//!
//! # Invariants
//! - `CensusOperation::operation_id` and `PalmTree::tree_id` are unique.
//! - All counts are non-negative (`u32`); areas are finite and non-negative.
//! - Timestamps are UTC with millisecond precision.

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

pub mod census;
pub mod company;
pub mod role;
pub mod tree;

/// Record invariant violations detected before writes and after reads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordValidationError {
    #[error("{record}.{field} must not be empty")]
    EmptyField {
        record: &'static str,
        field: &'static str,
    },
    #[error("{record}.{field} must be a finite non-negative area, got {value}")]
    InvalidArea {
        record: &'static str,
        field: &'static str,
        value: f64,
    },
    #[error("palm_tree.{field} is out of range: {value}")]
    InvalidCoordinate { field: &'static str, value: f64 },
    #[error("palm_tree.health_score must be within [0.0, 1.0], got {0}")]
    HealthScoreOutOfRange(f64),
}

/// Current UTC time truncated to the precision the store persists.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub(crate) fn require_text(
    record: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::EmptyField { record, field });
    }
    Ok(())
}

pub(crate) fn require_area(
    record: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), RecordValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(RecordValidationError::InvalidArea {
            record,
            field,
            value,
        });
    }
    Ok(())
}
