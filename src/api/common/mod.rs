//
//  rested-api
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! Shared types used by the transport, the API client, the token manager, and
//! the route registry.
//!
//! # Overview
//!
//! - [`HttpMethod`] - The four verbs a route can expose
//! - [`RawResponse`] - One completed HTTP exchange, before interpretation
//! - [`ApiResponse`] - A successful outcome, parsed or raw
//! - [`ApiError`] - Every asynchronous failure kind, with a stable shape
//! - [`Envelope`] - The `{"data": ...}` wrapper used by the token endpoint
//!
//! # Example
//!
//! ```rust
//! use rested_api::api::common::{ApiError, ErrorBody};
//!
//! fn describe(err: &ApiError) -> String {
//!     match err {
//!         ApiError::Server { status, body: ErrorBody::Parsed(json) } => {
//!             format!("{}: {}", status, json)
//!         }
//!         ApiError::MethodNotAllowed { route, method } => {
//!             format!("{} is not allowed on {}", method, route)
//!         }
//!         other => other.to_string(),
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::api::transport::TransportError;
use crate::registry::RegistryError;

/// HTTP verbs exposed by routes.
///
/// Method names are case-normalized: parsing accepts any case, rendering is
/// always upper-case.
///
/// # Example
///
/// ```rust
/// use rested_api::api::common::HttpMethod;
///
/// let method: HttpMethod = "post".parse()?;
/// assert_eq!(method, HttpMethod::Post);
/// assert_eq!(method.as_str(), "POST");
/// assert!(method.sends_body());
/// assert!(!HttpMethod::Get.sends_body());
/// # Ok::<(), rested_api::api::common::UnknownMethod>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// All verbs, in the order routes publish them.
    pub const ALL: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Returns the upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns the lower-case prefix used for exposed method names (`get`, `post`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }

    /// Whether a request body is sent with this verb.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a verb outside GET, POST, PUT, DELETE.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A completed HTTP exchange, regardless of status code.
///
/// Header names are lower-case. The body is kept as text; interpretation is
/// left to the API client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawResponse {
    /// Final request URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Whether the body carries any content.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Whether the status signals a failure (400 and above).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Successful outcome of an authenticated call.
///
/// With response parsing enabled and a non-empty body, the parsed JSON is
/// returned; otherwise the raw response is handed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    /// Parsed JSON body.
    Parsed(Value),
    /// Raw response, when parsing is disabled or the body is empty.
    Raw(RawResponse),
}

impl ApiResponse {
    /// Returns the parsed body, if any.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Returns the raw response, if parsing was skipped.
    pub fn raw(&self) -> Option<&RawResponse> {
        match self {
            Self::Parsed(_) => None,
            Self::Raw(raw) => Some(raw),
        }
    }

    /// Deserializes the parsed body into a typed value.
    ///
    /// A raw response is deserialized from its body text.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            Self::Parsed(value) => serde_json::from_value(value),
            Self::Raw(raw) => serde_json::from_str(&raw.body),
        }
    }
}

/// Payload carried by a server error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// The error body, parsed as JSON.
    Parsed(Value),
    /// The raw response, when parsing is disabled or the body is empty.
    Raw(RawResponse),
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(value) => write!(f, "{}", value),
            Self::Raw(raw) if raw.has_body() => f.write_str(&raw.body),
            Self::Raw(_) => f.write_str("<empty body>"),
        }
    }
}

/// The `{"data": ...}` wrapper used by the token endpoint.
///
/// # Example
///
/// ```rust
/// use rested_api::api::common::Envelope;
///
/// let json = r#"{"data": "header.claims.signature"}"#;
/// let envelope: Envelope<String> = serde_json::from_str(json)?;
/// assert_eq!(envelope.data, "header.claims.signature");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The wrapped payload.
    pub data: T,
}

/// Unified error type for every asynchronous failure of the client.
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `Transport` | Network failure or timeout, no response received |
/// | `Server` | Response status is 400 or above |
/// | `MethodNotAllowed` | A route verb outside the registered set was called |
/// | `InvalidJson` | Response parsing is enabled and the body is not JSON |
/// | `InvalidTokenResponse` | The token endpoint answered without a token |
/// | `Registry` | Dispatch by exposed name hit an unknown route or method |
/// | `InvalidOptions` | Option overrides had the wrong types |
///
/// None of these are retried.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The exchange failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status of 400 or above.
    #[error("Server error ({status}): {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Parsed error body, or the raw response.
        body: ErrorBody,
    },

    /// The route does not allow this verb. No request was sent.
    #[error("Method not allowed: {method} on route '{route}'")]
    MethodNotAllowed {
        /// Route name.
        route: String,
        /// The rejected verb.
        method: HttpMethod,
    },

    /// The response body could not be parsed as JSON.
    #[error("Invalid JSON in response ({status}): {source}")]
    InvalidJson {
        /// HTTP status code of the response.
        status: u16,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The token endpoint answered successfully but carried no usable token.
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Dispatch by name failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Option overrides did not fit the option types.
    #[error("Invalid client options: {0}")]
    InvalidOptions(#[source] serde_json::Error),
}

impl ApiError {
    /// Returns the HTTP status, for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::InvalidJson { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the parsed error body, for server errors with a JSON body.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Server {
                body: ErrorBody::Parsed(value),
                ..
            } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_serde() {
        let methods: Vec<HttpMethod> = serde_json::from_value(json!(["get", "POST"])).unwrap();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(serde_json::to_value(HttpMethod::Put).unwrap(), json!("PUT"));
    }

    #[test]
    fn test_api_response_into_typed() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Widget {
            name: String,
        }

        let parsed = ApiResponse::Parsed(json!({"name": "x"}));
        assert_eq!(
            parsed.into_typed::<Widget>().unwrap(),
            Widget { name: "x".into() }
        );

        let raw = ApiResponse::Raw(RawResponse {
            status: 200,
            body: r#"{"name":"y"}"#.to_string(),
            ..Default::default()
        });
        assert_eq!(raw.into_typed::<Widget>().unwrap().name, "y");
    }

    #[test]
    fn test_server_error_accessors() {
        let err = ApiError::Server {
            status: 404,
            body: ErrorBody::Parsed(json!({"error": "not found"})),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(&json!({"error": "not found"})));
        assert!(err.to_string().contains("404"));
    }
}
