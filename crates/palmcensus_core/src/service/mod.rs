//! Census aggregation and dashboard use-cases.
//!
//! # Responsibility
//! - Turn raw census records into summaries, health tiers and projections.
//! - Keep presentation layers decoupled from storage details.
//!
//! # Invariants
//! - Services read through an injected `RecordStore`; no global handle.
//! - Absent data degrades to zero/empty values; store errors propagate
//!   unchanged.

pub mod aggregation;
pub mod census_service;
pub mod dashboard;
pub mod health;
pub mod prediction;
pub mod seed;
