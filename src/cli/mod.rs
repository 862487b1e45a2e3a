//
//  rested-api
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod call;
mod config;
mod route;
mod token;

pub use call::CallCommand;
pub use config::ConfigCommand;
pub use route::RouteCommand;
pub use token::TokenCommand;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::api::RestedApi;
use crate::bootstrap::{BootstrapSource, BootstrapValues, DocumentSource, EnvSource, StaticSource};
use crate::config::Config;
use crate::util::object::Mapping;

/// rested - Call REST APIs with a managed bearer token
#[derive(Parser, Debug)]
#[command(
    name = "rested",
    version,
    about = "Call REST APIs with a managed bearer token",
    long_about = "rested is a client for token-authenticated REST APIs.\n\n\
                  It keeps the bearer token fresh, exposes named routes from the \
                  config file, and prints parsed responses.",
    propagate_version = true,
    after_help = "Use 'rested <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "RESTED_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL, overriding every bootstrap source
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token, overriding every bootstrap source
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// CSRF marker sent on token refresh
    #[arg(long, global = true)]
    pub csrf: Option<String>,

    /// HTML document to read <meta> bootstrap values from
    #[arg(long, global = true)]
    pub document: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make an authenticated request
    Call(CallCommand),

    /// List and call configured routes
    #[command(visible_alias = "r")]
    Route(RouteCommand),

    /// Inspect or refresh the bearer token
    Token(TokenCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Print version information
    Version,
}

impl GlobalOptions {
    /// Loads the configuration file named by `--config`, or the default one.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    /// Collects bootstrap values. Flags win over the environment, which wins
    /// over the document, which wins over the `[bootstrap]` section.
    pub fn bootstrap_values(&self, config: &Config) -> Result<BootstrapValues> {
        let flags = BootstrapValues::new(self.base_url.clone(), self.token.clone(), self.csrf.clone());
        let mut values = flags.or(EnvSource::from_env().load()?);

        let document = self.document.clone().or_else(|| config.bootstrap.document.clone());
        if let Some(path) = document {
            let source = DocumentSource::from_file(&path)?;
            values = values.or(source.load()?);
        }

        Ok(values.or(config.bootstrap.values()))
    }

    /// Builds a client context from configuration and bootstrap sources.
    ///
    /// Configured routes are registered. With `autoload` off, only values
    /// given on the command line are seeded.
    pub async fn build_api(&self) -> Result<(Config, RestedApi)> {
        let config = self.load_config()?;
        let mut api = RestedApi::new(config.client.clone()).context("Failed to build HTTP client")?;
        let routes = config.register_routes(&mut api)?;
        debug!("Registered {} routes from config", routes);

        let values = self.bootstrap_values(&config)?;
        if !api.autoload(&StaticSource(values)).await? {
            let flags = BootstrapValues::new(self.base_url.clone(), self.token.clone(), self.csrf.clone());
            if !flags.is_empty() {
                api.bootstrap(&StaticSource(flags)).await?;
            }
        }

        Ok((config, api))
    }
}

/// Parses `key<sep>value` pairs into a mapping. Later keys win.
///
/// Values are kept as strings; whitespace around keys and values is trimmed.
pub(crate) fn parse_pairs(items: &[String], separator: char) -> Result<Mapping> {
    let mut mapping = Mapping::new();
    for item in items {
        let Some((key, value)) = item.split_once(separator) else {
            bail!("Invalid pair: {}. Expected key{}value", item, separator);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid pair: {}. Key is empty", item);
        }
        mapping.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(mapping)
}

/// Parses a request body: inline JSON, `@path` to read a file, or `@-` for stdin.
pub(crate) fn parse_payload(data: Option<&str>) -> Result<Option<Value>> {
    let Some(data) = data else {
        return Ok(None);
    };

    let content = match data.strip_prefix('@') {
        Some("-") => {
            let mut buffer = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
            buffer
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request body from {}", path))?,
        None => data.to_string(),
    };

    let value = serde_json::from_str(&content).context("Request body is not valid JSON")?;
    Ok(Some(value))
}
