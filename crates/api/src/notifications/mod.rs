//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and files
//! notifications into the [`NotificationInbox`], which the
//! `/notifications` endpoints read and append to.

pub mod inbox;
pub mod router;

pub use inbox::{Notification, NotificationInbox};
pub use router::NotificationRouter;
