//! # HTTP Server
//!
//! Combines the predicate and observability routers into one axum app.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::observability::{log_event, log_event_with_fields, Event};
use crate::predicates::PredicateRegistry;

use super::config::{any_origin_layer, HttpConfigError, HttpServerConfig};
use super::observability_routes::observability_routes;
use super::predicate_routes::{predicate_routes, PredicateState};

/// HTTP server for an OTFC predicate registry
pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<PredicateState>,
    router: Router,
}

impl HttpServer {
    /// Create a server over `registry` with default configuration
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        let config = HttpServerConfig::default();
        let state = Arc::new(PredicateState::new(registry));
        let router = Self::build_router(any_origin_layer(), state.clone());
        Self {
            config,
            state,
            router,
        }
    }

    /// Create a server over `registry` with custom configuration
    ///
    /// Fails if the configuration does not validate.
    pub fn with_config(
        config: HttpServerConfig,
        registry: Arc<PredicateRegistry>,
    ) -> Result<Self, HttpConfigError> {
        config.validate()?;
        let cors = config.cors_layer()?;
        let state = Arc::new(PredicateState::new(registry));
        let router = Self::build_router(cors, state.clone());
        Ok(Self {
            config,
            state,
            router,
        })
    }

    fn build_router(cors: CorsLayer, state: Arc<PredicateState>) -> Router {
        Router::new()
            .merge(predicate_routes(state.clone()))
            .merge(observability_routes(state))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Shared state (registry, dispatcher, counters)
    pub fn state(&self) -> &Arc<PredicateState> {
        &self.state
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until ctrl-c
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        log_event_with_fields(
            Event::ServerListening,
            &[
                ("addr", &addr.to_string()),
                ("predicates", &self.state.registry().len().to_string()),
            ],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        log_event(Event::Shutdown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(Arc::new(PredicateRegistry::new()));
        assert_eq!(server.socket_addr(), "0.0.0.0:8008");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(config, Arc::new(PredicateRegistry::new())).unwrap();
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_server_rejects_invalid_origin() {
        let config = HttpServerConfig {
            cors_origins: vec!["not\u{7f}an origin".into()],
            ..Default::default()
        };
        let err = HttpServer::with_config(config, Arc::new(PredicateRegistry::new())).err().unwrap();
        assert!(matches!(err, HttpConfigError::InvalidOrigin(_)));
    }

    #[test]
    fn test_server_shares_registry() {
        let registry = Arc::new(PredicateRegistry::new());
        let server = HttpServer::new(registry.clone());
        registry
            .register_compute("late", "q", "s", |row| Ok(row.clone()))
            .unwrap();
        assert_eq!(server.state().registry().len(), 1);
    }
}
