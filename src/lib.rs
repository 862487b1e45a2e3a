//
//  rested-api
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # RestedAPI
//!
//! A small REST client framework for token-authenticated JSON APIs.
//!
//! ## Overview
//!
//! A [`RestedApi`] context owns the client options, the bearer token, and two
//! registries. Routes map a name to a path and a set of allowed verbs;
//! factories map a name to a constructor or a shared value. Every call asks
//! the token manager for a valid token first, refreshing it from the token
//! endpoint when it is missing or about to expire.
//!
//! ## Features
//!
//! - **Token lifecycle**: JWT expiry decoding with a 5 second margin, refresh with CSRF marker
//! - **Route registry**: `get<Name>`/`post<Name>`/... exposed per allowed verb
//! - **Factory registry**: constructors or singletons, downcast on `make`
//! - **Object operations**: deep merge, clone, and diff over JSON mappings
//! - **Bootstrap**: base URL, token, and CSRF marker from HTML meta tags, environment, or config
//!
//! ## Module Structure
//!
//! - [`api`]: Transport, authenticated client, and the [`RestedApi`] context
//! - [`auth`]: Token decoding and the token manager
//! - [`registry`]: Route and factory registries
//! - [`bootstrap`]: Sources for the initial configuration points
//! - [`config`]: Configuration file management
//! - [`output`]: Output formatting (Table, JSON) for the binary
//! - [`cli`]: Command-line interface definitions using clap
//! - [`util`]: Type introspection, object operations, string helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rested_api::api::{ClientOptions, RestedApi};
//! use rested_api::bootstrap::EnvSource;
//! use rested_api::registry::{RouteCall, RouteOptions};
//! use rested_api::api::HttpMethod;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut api = RestedApi::new(ClientOptions::default())?;
//! api.autoload(&EnvSource::from_env()).await?;
//!
//! api.register_route("widgets", RouteOptions {
//!     path: "/widgets".into(),
//!     methods: vec![HttpMethod::Get, HttpMethod::Post],
//!     ..Default::default()
//! })?;
//!
//! let widgets = api.route("widgets")?.get(RouteCall::new()).await?;
//! println!("{:?}", widgets.json());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains the `rested` commands and global options, defined using the clap
/// derive API.
pub mod cli;

/// Transport, authenticated API client, and the client context.
pub mod api;

/// Bearer token decoding and lifecycle.
pub mod auth;

/// Bootstrap sources for base URL, token, and CSRF marker.
pub mod bootstrap;

/// Configuration file management.
///
/// Stored in platform-specific locations:
/// - Linux: `~/.config/rested/config.toml`
/// - macOS: `~/Library/Application Support/rested/config.toml`
/// - Windows: `%APPDATA%\rested\config.toml`
pub mod config;

/// Output formatting for the binary (Table, JSON).
pub mod output;

/// Route and factory registries.
pub mod registry;

/// Type introspection, object operations, and string helpers.
pub mod util;

/// Re-export of the main CLI struct.
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Re-export of the client context.
pub use api::RestedApi;

/// Application name, used for the binary and the configuration directory.
pub const APP_NAME: &str = "rested";

/// Application version, taken from Cargo.toml at compile time.
///
/// # Example
///
/// ```rust
/// use rested_api::VERSION;
///
/// println!("rested version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
/// - `32+`: External service issues
pub mod exit_codes {
    use crate::api::ApiError;

    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments, including verbs a route does not allow.
    pub const USAGE: i32 = 2;

    /// Authentication required or failed (401, 403, or the token endpoint
    /// gave no token).
    pub const AUTH_ERROR: i32 = 4;

    /// Resource or route not found.
    pub const NOT_FOUND: i32 = 8;

    /// Rate limit exceeded (429).
    pub const RATE_LIMIT: i32 = 32;

    /// Maps an API error to an exit code.
    ///
    /// ```rust
    /// use rested_api::api::common::{ApiError, ErrorBody};
    /// use rested_api::exit_codes;
    ///
    /// let err = ApiError::Server { status: 404, body: ErrorBody::Parsed(serde_json::Value::Null) };
    /// assert_eq!(exit_codes::for_api_error(&err), exit_codes::NOT_FOUND);
    /// ```
    pub fn for_api_error(err: &ApiError) -> i32 {
        match err {
            ApiError::Server { status: 401 | 403, .. } | ApiError::InvalidTokenResponse(_) => AUTH_ERROR,
            ApiError::Server { status: 404, .. } => NOT_FOUND,
            ApiError::Server { status: 429, .. } => RATE_LIMIT,
            ApiError::MethodNotAllowed { .. } | ApiError::Registry(_) => USAGE,
            _ => ERROR,
        }
    }
}
