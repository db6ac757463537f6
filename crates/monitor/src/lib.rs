//! `hive-monitor` library crate.
//!
//! The polling side of the dashboard: a typed client for the backend, a
//! connectivity check for the local ingest agent, an explicit scheduler for
//! the status tick and job polling, and the session bookkeeping that keeps
//! stale fetches from overwriting newer ones. The binary entrypoint lives
//! in `main.rs`.

pub mod agent_check;
pub mod board;
pub mod client;
pub mod config;
pub mod monitor;
pub mod scheduler;
pub mod session;
