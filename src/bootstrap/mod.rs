//
//  rested-api
//  bootstrap/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bootstrap
//!
//! Reads the three initial configuration points: the API base URL, an initial
//! bearer token, and the CSRF marker. Where they come from is up to the
//! [`BootstrapSource`]:
//!
//! | Source | Base URL | Token | CSRF marker |
//! |--------|----------|-------|-------------|
//! | [`DocumentSource`] | `<meta name="api-base">` | `<meta name="api-token">` | `<meta name="csrf-token">` |
//! | [`EnvSource`] | `RESTED_API_BASE` | `RESTED_API_TOKEN` | `RESTED_CSRF_TOKEN` |
//! | [`StaticSource`] | given | given | given |
//!
//! Empty values count as absent. Sources can be layered with
//! [`BootstrapValues::or`], earlier values winning.
//!
//! ## Example
//!
//! ```rust
//! use rested_api::bootstrap::{BootstrapSource, DocumentSource};
//!
//! let html = r#"
//!     <head>
//!       <meta name="api-base" content="https://example.com/api">
//!       <meta name="csrf-token" content="abc123">
//!     </head>
//! "#;
//!
//! let values = DocumentSource::new(html).load()?;
//! assert_eq!(values.base_url.as_deref(), Some("https://example.com/api"));
//! assert_eq!(values.token, None);
//! assert_eq!(values.csrf.as_deref(), Some("abc123"));
//! # Ok::<(), rested_api::bootstrap::BootstrapError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Meta name carrying the API base URL.
pub const META_API_BASE: &str = "api-base";
/// Meta name carrying the initial bearer token.
pub const META_API_TOKEN: &str = "api-token";
/// Meta name carrying the CSRF marker.
pub const META_CSRF_TOKEN: &str = "csrf-token";

/// Environment variable carrying the API base URL.
pub const ENV_API_BASE: &str = "RESTED_API_BASE";
/// Environment variable carrying the initial bearer token.
pub const ENV_API_TOKEN: &str = "RESTED_API_TOKEN";
/// Environment variable carrying the CSRF marker.
pub const ENV_CSRF_TOKEN: &str = "RESTED_CSRF_TOKEN";

static META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b([^>]*)>").unwrap());

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#).unwrap()
});

/// Errors raised while reading a bootstrap source.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The document could not be read.
    #[error("Failed to read bootstrap document {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// The three bootstrap configuration points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapValues {
    /// API base URL
    pub base_url: Option<String>,
    /// Initial bearer token
    pub token: Option<String>,
    /// CSRF marker sent on token refresh
    pub csrf: Option<String>,
}

impl BootstrapValues {
    /// Creates values, dropping empty strings.
    pub fn new(base_url: Option<String>, token: Option<String>, csrf: Option<String>) -> Self {
        Self {
            base_url: non_empty(base_url),
            token: non_empty(token),
            csrf: non_empty(csrf),
        }
    }

    /// Fills absent values from `fallback`.
    pub fn or(self, fallback: BootstrapValues) -> Self {
        Self {
            base_url: self.base_url.or(fallback.base_url),
            token: self.token.or(fallback.token),
            csrf: self.csrf.or(fallback.csrf),
        }
    }

    /// Whether no value is present.
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.token.is_none() && self.csrf.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Supplies bootstrap values.
pub trait BootstrapSource {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Reads the values.
    ///
    /// # Errors
    ///
    /// Returns a [`BootstrapError`] when the underlying source cannot be read.
    fn load(&self) -> Result<BootstrapValues, BootstrapError>;
}

/// Reads `<meta name=... content=...>` entries from an HTML document.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    html: String,
}

impl DocumentSource {
    /// Wraps an HTML document.
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Reads an HTML document from disk.
    ///
    /// # Errors
    ///
    /// [`BootstrapError::Io`] when the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, BootstrapError> {
        let html = std::fs::read_to_string(path).map_err(|source| BootstrapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(html))
    }

    /// Returns the `content` of the first `<meta>` whose `name` matches.
    pub fn meta(&self, name: &str) -> Option<String> {
        META_TAG.captures_iter(&self.html).find_map(|tag| {
            let attributes = parse_attributes(tag.get(1)?.as_str());
            let matches = attributes
                .get("name")
                .is_some_and(|n| n.eq_ignore_ascii_case(name));
            if matches {
                attributes.get("content").cloned()
            } else {
                None
            }
        })
    }
}

fn parse_attributes(raw: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            Some((key, value))
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

impl BootstrapSource for DocumentSource {
    fn name(&self) -> &'static str {
        "document"
    }

    fn load(&self) -> Result<BootstrapValues, BootstrapError> {
        Ok(BootstrapValues::new(
            self.meta(META_API_BASE),
            self.meta(META_API_TOKEN),
            self.meta(META_CSRF_TOKEN),
        ))
    }
}

/// Reads the `RESTED_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshots the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Uses the given variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl BootstrapSource for EnvSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn load(&self) -> Result<BootstrapValues, BootstrapError> {
        Ok(BootstrapValues::new(
            self.vars.get(ENV_API_BASE).cloned(),
            self.vars.get(ENV_API_TOKEN).cloned(),
            self.vars.get(ENV_CSRF_TOKEN).cloned(),
        ))
    }
}

/// Fixed values, typically from the configuration file or command line.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub BootstrapValues);

impl BootstrapSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn load(&self) -> Result<BootstrapValues, BootstrapError> {
        Ok(self.0.clone())
    }
}
