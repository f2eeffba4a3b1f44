//! Observability for the OTFC service
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle and compute events
//! - Atomic compute counters
//!
//! # Usage
//!
//! ```ignore
//! use otfc::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::BatchComplete, &[("rows_out", "42")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogTarget, Logger, Severity};
pub use metrics::{ComputeMetrics, MetricsSnapshot};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
