//
//  rested-api
//  api/options.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Client options shared by the API client, the token manager, and the
//! configuration file's `[client]` section.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::auth::TOKEN_PATH;
use crate::util::object::{merge, Mapping};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Options for the API client.
///
/// Every field has a default, so partial TOML or JSON documents deserialize.
/// Unknown keys are rejected.
///
/// # Example
///
/// ```rust
/// use rested_api::api::ClientOptions;
///
/// let options: ClientOptions = toml::from_str(r#"
///     base_url = "https://example.com/api"
///     parse_response = false
/// "#)?;
///
/// assert_eq!(options.base_url, "https://example.com/api");
/// assert!(!options.parse_response);
/// assert!(options.autoload);
/// assert_eq!(options.token_endpoint(), "https://example.com/auth/token");
/// # Ok::<(), toml::de::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
    /// Prefix prepended to every call path
    pub base_url: String,
    /// Whether response bodies are parsed as JSON
    pub parse_response: bool,
    /// Whether `RestedApi::autoload` seeds values from its source
    pub autoload: bool,
    /// Token endpoint override; `/auth/token` on the API origin when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Whether concurrent refreshes share one exchange
    pub single_flight_refresh: bool,
    /// Whether query keys and values are form-encoded
    pub encode_query: bool,
    /// Query parameters merged under every call's query
    pub base_query: Mapping,
    /// Headers merged under every call's headers
    pub base_headers: Mapping,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            parse_response: true,
            autoload: true,
            token_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            single_flight_refresh: false,
            encode_query: false,
            base_query: Mapping::new(),
            base_headers: Mapping::new(),
        }
    }
}

impl ClientOptions {
    /// Returns the absolute URL of the token endpoint.
    ///
    /// An explicit `token_url` wins. Otherwise `/auth/token` is resolved
    /// against the origin of `base_url`. A base URL that cannot be parsed
    /// leaves the bare path.
    pub fn token_endpoint(&self) -> String {
        if let Some(url) = self.token_url.as_ref().filter(|u| !u.is_empty()) {
            return url.clone();
        }

        Url::parse(&self.base_url)
            .and_then(|base| base.join(TOKEN_PATH))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| TOKEN_PATH.to_string())
    }

    /// Builds the full URL for a call path.
    ///
    /// The base URL loses one trailing slash and the path gains a leading one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rested_api::api::ClientOptions;
    ///
    /// let options = ClientOptions {
    ///     base_url: "https://example.com/api/".into(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(options.url_for("widgets"), "https://example.com/api/widgets");
    /// assert_eq!(options.url_for("/widgets/1"), "https://example.com/api/widgets/1");
    /// ```
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.strip_suffix('/').unwrap_or(&self.base_url);
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", base, path)
    }

    /// Returns a copy with the given overrides merged in shallowly.
    ///
    /// Keys use the field names (`base_url`, `parse_response`, ...).
    ///
    /// # Errors
    ///
    /// Fails when an override has the wrong type for its field or names no
    /// field at all.
    pub fn merged(&self, overrides: &Mapping) -> Result<Self, serde_json::Error> {
        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Mapping::new(),
        };
        merge(false, &mut current, [overrides]);
        serde_json::from_value(Value::Object(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert!(options.parse_response);
        assert!(options.autoload);
        assert!(!options.single_flight_refresh);
        assert!(!options.encode_query);
        assert_eq!(options.timeout_secs, 30);
    }

    #[test]
    fn test_token_endpoint() {
        let mut options = ClientOptions {
            base_url: "https://example.com/api/v1".into(),
            ..Default::default()
        };
        assert_eq!(options.token_endpoint(), "https://example.com/auth/token");

        options.token_url = Some("https://auth.example.com/token".into());
        assert_eq!(options.token_endpoint(), "https://auth.example.com/token");

        let relative = ClientOptions::default();
        assert_eq!(relative.token_endpoint(), "/auth/token");
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let options = ClientOptions {
            base_url: "http://h".into(),
            ..Default::default()
        };
        assert_eq!(options.url_for("/a"), "http://h/a");
        assert_eq!(options.url_for("a"), "http://h/a");
    }

    #[test]
    fn test_merged_is_shallow() {
        let options = ClientOptions {
            base_query: json!({"a": 1, "b": 2}).as_object().cloned().unwrap(),
            ..Default::default()
        };

        let overrides = json!({"base_query": {"c": 3}, "parse_response": false});
        let merged = options.merged(overrides.as_object().unwrap()).unwrap();

        assert!(!merged.parse_response);
        assert_eq!(Value::Object(merged.base_query), json!({"c": 3}));
    }

    #[test]
    fn test_merged_rejects_unknown_keys() {
        let overrides = json!({"baseUrl": "http://h"});
        let err = ClientOptions::default()
            .merged(overrides.as_object().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("baseUrl"));
    }

    #[test]
    fn test_merged_rejects_wrong_types() {
        let overrides = json!({"timeout_secs": "soon"});
        assert!(ClientOptions::default()
            .merged(overrides.as_object().unwrap())
            .is_err());
    }
}
