//! HTTP binding and CORS policy
//!
//! Loaded as the `http` section of the service config file. Every origin in
//! `cors_origins` must parse as a header value; a bad entry fails validation
//! instead of silently narrowing the allow-list.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Port the original OTFC demo service listens on
pub const DEFAULT_PORT: u16 = 8008;

/// Rejected HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpConfigError {
    #[error("http.host must not be empty")]
    EmptyHost,

    #[error("http.port must be > 0")]
    ZeroPort,

    #[error("http.cors_origins contains an invalid origin: {0:?}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// CORS policy of an empty allow-list
pub(crate) fn any_origin_layer() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// `host:port` for the listener
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check binding and origins
    pub fn validate(&self) -> Result<(), HttpConfigError> {
        if self.host.trim().is_empty() {
            return Err(HttpConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(HttpConfigError::ZeroPort);
        }
        self.allowed_origins().map(|_| ())
    }

    /// Build the CORS layer for this policy
    pub fn cors_layer(&self) -> Result<CorsLayer, HttpConfigError> {
        if self.cors_origins.is_empty() {
            return Ok(any_origin_layer());
        }
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed_origins()?))
            .allow_methods(Any)
            .allow_headers(Any))
    }

    fn allowed_origins(&self) -> Result<Vec<HeaderValue>, HttpConfigError> {
        self.cors_origins
            .iter()
            .map(|origin| {
                let trimmed = origin.trim();
                if trimmed.is_empty() {
                    return Err(HttpConfigError::InvalidOrigin(origin.clone()));
                }
                HeaderValue::from_str(trimmed)
                    .map_err(|_| HttpConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8008");
        assert!(config.cors_origins.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: HttpServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_empty_host_and_zero_port_rejected() {
        let mut config = HttpServerConfig::with_port(0);
        assert_eq!(config.validate(), Err(HttpConfigError::ZeroPort));

        config.port = DEFAULT_PORT;
        config.host = "  ".into();
        assert_eq!(config.validate(), Err(HttpConfigError::EmptyHost));
    }

    #[test]
    fn test_valid_origins_accepted() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".into(), "https://otfc.example.org".into()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.cors_layer().is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".into(), "http://bad\norigin".into()],
            ..Default::default()
        };

        let err = config.validate().err().unwrap();
        assert_eq!(err, HttpConfigError::InvalidOrigin("http://bad\norigin".into()));
        assert!(config.cors_layer().is_err());
    }

    #[test]
    fn test_blank_origin_rejected() {
        let config = HttpServerConfig {
            cors_origins: vec![String::new()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HttpConfigError::InvalidOrigin(_))));
    }
}
