//! Hive event bus and application state broadcasting.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`HiveEvent`]: the typed event envelope carried on the bus.
//! - [`AppSelection`]: owner of the selected organization and project,
//!   announcing changes on the bus.

pub mod bus;
pub mod selection;

pub use bus::{EventBus, EventKind, HiveEvent};
pub use selection::{AppSelection, Selection};
