//! # OTFC Predicates
//!
//! Registry of on-the-fly computation predicates and the dispatcher that
//! runs their callbacks over batches of query rows.

pub mod demo;
pub mod dispatcher;
pub mod errors;
pub mod predicate;
pub mod registry;

pub use demo::register_demo_predicates;
pub use dispatcher::{BatchDispatcher, ComputationBatch, ComputationResult, RowFailure};
pub use errors::{PredicateError, PredicateResult};
pub use predicate::{Callback, Predicate, PredicateDescriptor, PredicateKind, Row};
pub use registry::PredicateRegistry;
