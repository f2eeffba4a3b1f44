//! otfc - on-the-fly computation predicate service
//!
//! Hosts register named predicates whose callbacks turn one query row into
//! one key/value row. The service lists them and computes batches of rows
//! against them, isolating per-row failures.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod predicates;
