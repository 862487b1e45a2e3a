//
//  rested-api
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the `rested` configuration file: client options, bootstrap
//! values, and route definitions.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/rested/config.toml`
//! - **macOS**: `~/Library/Application Support/rested/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\rested\config.toml`
//!
//! `--config <PATH>` or `RESTED_CONFIG` point elsewhere.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [client]
//! base_url = "https://example.com/api"
//! parse_response = true
//! timeout_secs = 10
//!
//! [client.base_headers]
//! Accept = "application/json"
//!
//! [bootstrap]
//! document = "public/index.html"
//! csrf = "from-config"
//!
//! [routes.widgets]
//! path = "/widgets"
//! methods = ["GET", "POST"]
//!
//! [routes.widgetParts]
//! path = "/widgets/parts"
//! query = { expand = "all" }
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: File I/O helpers

mod file;

pub use file::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::{ClientOptions, RestedApi};
use crate::bootstrap::BootstrapValues;
use crate::registry::RouteOptions;

/// Bootstrap values from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// HTML document whose `<meta>` tags are read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,
    /// API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Initial bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// CSRF marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
}

impl BootstrapConfig {
    /// Returns the static values, dropping empty strings.
    pub fn values(&self) -> BootstrapValues {
        BootstrapValues::new(self.base_url.clone(), self.token.clone(), self.csrf.clone())
    }
}

/// The configuration file.
///
/// # Example
///
/// ```rust
/// use rested_api::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [client]
///     base_url = "https://example.com/api"
///
///     [routes.widgets]
///     path = "/widgets"
///     methods = ["get", "post"]
/// "#)?;
///
/// assert_eq!(config.get("base_url"), Some("https://example.com/api".to_string()));
/// assert_eq!(config.routes["widgets"].methods.len(), 2);
/// # Ok::<(), toml::de::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Client options.
    #[serde(default)]
    pub client: ClientOptions,

    /// Bootstrap values.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Routes keyed by name, registered at startup.
    #[serde(default)]
    pub routes: BTreeMap<String, RouteOptions>,
}

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "parse_response",
    "autoload",
    "token_url",
    "timeout_secs",
    "single_flight_refresh",
    "encode_query",
    "bootstrap.document",
    "bootstrap.base_url",
    "bootstrap.token",
    "bootstrap.csrf",
];

impl Config {
    /// Loads configuration from `path`, or from the default location.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed, or if no
    /// default location can be determined.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = read_config_file(path)?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Saves configuration to `path`, or to the default location.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path)?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_config_file(&path, &content)?;
        Ok(path)
    }

    /// Returns `path` if given, else the default location.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Fails if the platform configuration directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Registers every configured route.
    ///
    /// # Returns
    ///
    /// The number of routes registered.
    ///
    /// # Errors
    ///
    /// Fails on the first route with an invalid name.
    pub fn register_routes(&self, api: &mut RestedApi) -> Result<usize> {
        for (name, options) in &self.routes {
            api.register_route(name, options.clone())
                .with_context(|| format!("Invalid route in config: [routes.{}]", name))?;
        }
        Ok(self.routes.len())
    }

    /// Gets a value by key. See [`CONFIG_KEYS`].
    ///
    /// # Returns
    ///
    /// `None` for unknown keys and unset optional values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rested_api::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("parse_response"), Some("true".to_string()));
    /// assert_eq!(config.get("token_url"), None);
    /// assert_eq!(config.get("nope"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        let client = &self.client;
        let bootstrap = &self.bootstrap;

        match key {
            "base_url" => Some(client.base_url.clone()),
            "parse_response" => Some(client.parse_response.to_string()),
            "autoload" => Some(client.autoload.to_string()),
            "token_url" => client.token_url.clone(),
            "timeout_secs" => Some(client.timeout_secs.to_string()),
            "single_flight_refresh" => Some(client.single_flight_refresh.to_string()),
            "encode_query" => Some(client.encode_query.to_string()),
            "bootstrap.document" => bootstrap.document.as_ref().map(|p| p.display().to_string()),
            "bootstrap.base_url" => bootstrap.base_url.clone(),
            "bootstrap.token" => bootstrap.token.clone(),
            "bootstrap.csrf" => bootstrap.csrf.clone(),
            _ => None,
        }
    }

    /// Sets a value by key. See [`CONFIG_KEYS`].
    ///
    /// # Returns
    ///
    /// `Ok(false)` for unknown keys.
    ///
    /// # Errors
    ///
    /// Fails when a boolean or numeric key gets a value of the wrong shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rested_api::config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.set("timeout_secs", "5")?);
    /// assert_eq!(config.client.timeout_secs, 5);
    /// assert!(config.set("parse_response", "maybe").is_err());
    /// assert!(!config.set("nope", "x")?);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        let client = &mut self.client;
        let bootstrap = &mut self.bootstrap;

        match key {
            "base_url" => client.base_url = value.to_string(),
            "parse_response" => client.parse_response = parse_bool(key, value)?,
            "autoload" => client.autoload = parse_bool(key, value)?,
            "token_url" => client.token_url = optional(value),
            "timeout_secs" => {
                client.timeout_secs = value
                    .parse::<u64>()
                    .with_context(|| format!("'{}' expects a number of seconds, got '{}'", key, value))?
            }
            "single_flight_refresh" => client.single_flight_refresh = parse_bool(key, value)?,
            "encode_query" => client.encode_query = parse_bool(key, value)?,
            "bootstrap.document" => bootstrap.document = optional(value).map(PathBuf::from),
            "bootstrap.base_url" => bootstrap.base_url = optional(value),
            "bootstrap.token" => bootstrap.token = optional(value),
            "bootstrap.csrf" => bootstrap.csrf = optional(value),
            _ => return Ok(false),
        }

        Ok(true)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("'{}' expects true or false, got '{}'", key, value),
    }
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::HttpMethod;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("base_url", "https://example.com/api").unwrap();
        config.set("bootstrap.csrf", "marker").unwrap();
        config.routes.insert(
            "widgets".into(),
            RouteOptions {
                path: "/widgets".into(),
                methods: vec![HttpMethod::Get, HttpMethod::Delete],
                ..Default::default()
            },
        );

        assert_eq!(config.save(Some(&path)).unwrap(), path);
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid config file"));
    }

    #[test]
    fn test_misspelled_client_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nbaseUrl = \"http://h\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("baseUrl"));
    }

    #[test]
    fn test_set_and_get_every_key() {
        let mut config = Config::default();
        for key in CONFIG_KEYS {
            let value = match *key {
                "timeout_secs" => "12",
                "parse_response" | "autoload" | "single_flight_refresh" | "encode_query" => "yes",
                _ => "value",
            };
            assert!(config.set(key, value).unwrap(), "key {}", key);
            assert!(config.get(key).is_some(), "key {}", key);
        }

        config.set("token_url", "").unwrap();
        assert_eq!(config.get("token_url"), None);
    }

    #[tokio::test]
    async fn test_register_routes() {
        let config: Config = toml::from_str(
            r#"
            [routes.widgets]
            path = "/widgets"

            [routes.BadName]
            path = "/bad"
            "#,
        )
        .unwrap();

        let mut api = RestedApi::new(ClientOptions::default()).unwrap();
        let err = config.register_routes(&mut api).unwrap_err();
        assert!(format!("{:#}", err).contains("BadName"));
    }
}
