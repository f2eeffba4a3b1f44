//! Observability events for the OTFC service
//!
//! Every log record names one of these events. Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP listener bound, ready for requests
    ServerListening,
    /// Server stopped
    Shutdown,

    // Registry
    /// New predicate registered
    PredicateRegistered,
    /// Existing predicate overwritten
    PredicateReplaced,
    /// Registration refused
    PredicateRegistrationRejected,

    // Computation
    /// Batch refused before any row ran
    BatchRejected,
    /// One row's callback failed; the row was dropped
    RowComputeFailed,
    /// Batch finished
    BatchComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::Shutdown => "SHUTDOWN",
            Event::PredicateRegistered => "PREDICATE_REGISTERED",
            Event::PredicateReplaced => "PREDICATE_REPLACED",
            Event::PredicateRegistrationRejected => "PREDICATE_REGISTRATION_REJECTED",
            Event::BatchRejected => "BATCH_REJECTED",
            Event::RowComputeFailed => "ROW_COMPUTE_FAILED",
            Event::BatchComplete => "BATCH_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PredicateReplaced | Event::BatchRejected => Severity::Warn,
            Event::PredicateRegistrationRejected | Event::RowComputeFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
