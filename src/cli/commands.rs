//! CLI command implementations

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event, LogTarget, Logger};
use crate::predicates::{register_demo_predicates, BatchDispatcher, ComputationBatch, PredicateRegistry};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_json};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP binding
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Register the bundled demo predicates at startup (default true)
    #[serde(default = "default_demo_predicates")]
    pub demo_predicates: bool,
}

fn default_demo_predicates() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            demo_predicates: default_demo_predicates(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.http
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))
    }

    /// Build the registry this configuration describes
    pub fn build_registry(&self) -> CliResult<Arc<PredicateRegistry>> {
        let registry = Arc::new(PredicateRegistry::new());
        if self.demo_predicates {
            register_demo_predicates(&registry)?;
        }
        Ok(registry)
    }
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, host, port } => serve(config.as_deref(), host, port),
        Command::Predicates { config } => predicates(config.as_deref()),
        Command::Compute { config } => compute(config.as_deref()),
    }
}

/// Boot the registry and serve HTTP until interrupted
pub fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    log_event(Event::BootStart);

    let mut config = Config::load_or_default(config_path)?;
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    config.validate()?;

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("demo_predicates", &config.demo_predicates.to_string()),
            ("socket_addr", &config.http.socket_addr()),
        ],
    );

    let registry = config.build_registry()?;
    let server = HttpServer::with_config(config.http, registry)
        .map_err(|e| CliError::config_error(e.to_string()))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print registered predicate descriptors
///
/// Stdout carries only the JSON document; log lines go to stderr.
pub fn predicates(config_path: Option<&Path>) -> CliResult<()> {
    Logger::set_target(LogTarget::Stderr);
    let config = Config::load_or_default(config_path)?;
    let registry = config.build_registry()?;
    predicates_with(&registry, &mut io::stdout())
}

/// Write the descriptors of `registry` to `output`
pub fn predicates_with<W: Write>(registry: &PredicateRegistry, output: &mut W) -> CliResult<()> {
    write_json(output, &registry.list())
}

/// Compute one batch from stdin
///
/// Stdout carries only the JSON document; log lines go to stderr.
pub fn compute(config_path: Option<&Path>) -> CliResult<()> {
    Logger::set_target(LogTarget::Stderr);
    let config = Config::load_or_default(config_path)?;
    let dispatcher = BatchDispatcher::new(config.build_registry()?);
    compute_with(&dispatcher, &mut io::stdin(), &mut io::stdout())
}

/// Read a batch from `input`, write its result (or error) to `output`
pub fn compute_with<R: Read, W: Write>(
    dispatcher: &BatchDispatcher,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    let outcome = read_request::<_, ComputationBatch>(input)
        .and_then(|batch| dispatcher.execute(&batch).map_err(CliError::from));

    match outcome {
        Ok(result) => write_json(output, &result),
        Err(e) => {
            write_error(output, e.code_str(), e.message())?;
            Err(e)
        }
    }
}
