//! Domain logic for the production dashboard: event status derivation,
//! the process-point pipeline, the shot request state machine and the
//! ingestion job reconciler.
//!
//! This crate has no I/O. Callers supply the current time and log the
//! outcomes it returns.

pub mod clock;
pub mod error;
pub mod event;
pub mod event_status;
pub mod ingestion;
pub mod process_point;
pub mod reconcile;
pub mod report;
pub mod shot_request;
pub mod statistics;
pub mod store;
pub mod types;
