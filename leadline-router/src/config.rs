//! Service configuration
//!
//! Resolution order per value: command-line argument, environment
//! variable, optional TOML config file, compiled default. Clap folds env
//! vars into the parsed arguments, so an unset `Option` means "fall back
//! to the file layer, then the compiled default".

use clap::Parser;
use leadline_common::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5770;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_DB: &str = "leadline.db";

/// Command-line arguments for leadline-router
#[derive(Parser, Debug)]
#[command(name = "leadline-router")]
#[command(about = "Lead routing service: assigns inbound leads to callers")]
#[command(version)]
pub struct Args {
    /// Port to listen on [default: 5770]
    #[arg(short, long, env = "LEADLINE_PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(short, long, env = "LEADLINE_BIND")]
    pub bind: Option<String>,

    /// Path to the SQLite database file [default: leadline.db]
    #[arg(short, long, env = "LEADLINE_DB")]
    pub database: Option<PathBuf>,

    /// Optional TOML config file; CLI and env values take precedence
    #[arg(long, env = "LEADLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Optional TOML file layer
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    bind: Option<String>,
    database: Option<PathBuf>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve configuration from parsed arguments
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str::<FileConfig>(&content)
                    .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?
            }
            None => FileConfig::default(),
        };

        Ok(Self {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            bind: args
                .bind
                .clone()
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            db_path: args
                .database
                .clone()
                .or(file.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB)),
        })
    }
}
