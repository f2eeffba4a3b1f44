//! # OTFC HTTP Server Module
//!
//! Thin axum surface over the predicate registry and dispatcher.
//!
//! # Endpoints
//!
//! - `GET /predicates` - Registered predicate descriptors
//! - `POST /compute` - Compute a batch of rows against one predicate
//! - `GET /health` - Health check
//! - `GET /metrics` - Compute counters

pub mod config;
pub mod observability_routes;
pub mod predicate_routes;
pub mod server;

pub use config::{HttpConfigError, HttpServerConfig};
pub use predicate_routes::{ErrorResponse, PredicateState};
pub use server::HttpServer;
