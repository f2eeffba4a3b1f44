//! CLI argument definitions using clap
//!
//! Commands:
//! - otfc serve [--config <path>] [--host <host>] [--port <port>]
//! - otfc predicates [--config <path>]
//! - otfc compute [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OTFC - on-the-fly computation predicate service
#[derive(Parser, Debug)]
#[command(name = "otfc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the predicate REST API
    Serve {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Interface to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides the config file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the registered predicates as JSON
    Predicates {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compute one batch read from stdin and print the result
    Compute {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["otfc", "serve", "--host", "127.0.0.1", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Serve { config, host, port } => {
                assert!(config.is_none());
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_compute_with_config() {
        let cli = Cli::try_parse_from(["otfc", "compute", "--config", "otfc.json"]).unwrap();
        assert!(matches!(cli.command, Command::Compute { config: Some(_) }));
    }
}
