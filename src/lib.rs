//! Audit-event capture for content platforms.
//!
//! Lifecycle notifications from the host go through an [`EventBus`] to
//! four engines that diff before/after state and describe what changed.
//! The resulting entries are routed to SQLite or a text file, whichever the
//! settings select at write time.
//!
//! [`EventBus`]: crate::core::services::event_bus::EventBus

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod telemetry;
