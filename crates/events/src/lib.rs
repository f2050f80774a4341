//! Explicit pub/sub for sync notifications.
//!
//! The sync pipeline notifies decoupled observers (progress overlays, read
//! views) through an explicit subscriber list rather than an ambient global
//! event bus, so tests can assert exact delivery.

pub mod subscriber_list;

pub use subscriber_list::{SubscriberList, Subscription};
