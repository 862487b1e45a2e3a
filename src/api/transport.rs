//
//  rested-api
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Transport
//!
//! Executes exactly one raw HTTP exchange. The transport never interprets
//! status codes: any response that arrives, 2xx or 5xx, resolves to a
//! [`RawResponse`]. Only failures where no response arrives (connection
//! errors, timeouts) are reported as [`TransportError`].
//!
//! ## Query strings
//!
//! Query parameters are joined as `key=value` pairs with `&` and appended
//! after `?`. Values are not percent-encoded unless `encode_query` is
//! enabled, so reserved characters such as `&` or `=` inside a value will
//! corrupt the query string. Enable encoding when values are not under your
//! control.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use rested_api::api::transport::{HttpTransport, RawRequest, Transport};
//! use rested_api::api::common::HttpMethod;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = HttpTransport::new(Duration::from_secs(30), false)?;
//! let response = transport
//!     .request(RawRequest::new(HttpMethod::Get, "https://example.com/api/widgets"))
//!     .await?;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::common::{HttpMethod, RawResponse};
use crate::util::object::Mapping;

/// Failures where no response was received.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The exchange did not complete within the configured timeout.
    #[error("Request timed out: {method} {url}")]
    Timeout {
        /// Request verb.
        method: HttpMethod,
        /// Request URL including the query string.
        url: String,
    },

    /// Connection, DNS, TLS, or protocol failure.
    #[error("Network error during {method} {url}: {source}")]
    Network {
        /// Request verb.
        method: HttpMethod,
        /// Request URL including the query string.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// Offending header name.
        name: String,
    },

    /// The payload could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// One outgoing exchange.
///
/// `url` is absolute and carries no query string; parameters go in `query`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    /// Request verb.
    pub method: HttpMethod,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters.
    pub query: Mapping,
    /// Request headers.
    pub headers: Mapping,
    /// JSON payload, serialized to the body when present.
    pub payload: Option<Value>,
}

impl RawRequest {
    /// Creates a request with no query, headers, or payload.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Mapping::new(),
            headers: Mapping::new(),
            payload: None,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Replaces the query parameters.
    pub fn query(mut self, query: Mapping) -> Self {
        self.query = query;
        self
    }

    /// Replaces the headers.
    pub fn headers(mut self, headers: Mapping) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: Option<Value>) -> Self {
        self.payload = payload;
        self
    }
}

/// Executes raw HTTP exchanges.
///
/// Implementations resolve with the response for any status code and fail
/// only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one exchange.
    async fn request(&self, request: RawRequest) -> Result<RawResponse, TransportError>;
}

/// Renders a parameter or header value as text.
///
/// Strings are used verbatim, sequences are joined with `,`, everything else
/// uses its JSON rendering.
///
/// # Example
///
/// ```rust
/// use rested_api::api::transport::param_value;
/// use serde_json::json;
///
/// assert_eq!(param_value(&json!("a b")), "a b");
/// assert_eq!(param_value(&json!(3)), "3");
/// assert_eq!(param_value(&json!(["x", 1])), "x,1");
/// ```
pub fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(param_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Joins query parameters into `key=value&key=value`.
///
/// Pairs come out in key order, not insertion order, since [`Mapping`] keeps
/// its keys sorted.
///
/// # Parameters
///
/// * `query` - Parameters to join
/// * `encode` - Whether keys and values are form-encoded
///
/// # Example
///
/// ```rust
/// use rested_api::api::transport::build_query_string;
/// use serde_json::json;
///
/// let query = json!({"q": "a&b", "page": 2}).as_object().unwrap().clone();
/// assert_eq!(build_query_string(&query, false), "page=2&q=a&b");
/// assert_eq!(build_query_string(&query, true), "page=2&q=a%26b");
/// ```
pub fn build_query_string(query: &Mapping, encode: bool) -> String {
    query
        .iter()
        .map(|(key, value)| {
            let value = param_value(value);
            if encode {
                format!("{}={}", form_encode(key), form_encode(&value))
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn form_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Appends a query string to a URL.
///
/// Returns the URL unchanged when there are no parameters.
pub fn append_query(url: &str, query: &Mapping, encode: bool) -> String {
    if query.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, build_query_string(query, encode))
}

/// [`Transport`] backed by `reqwest`.
///
/// Cookies set by the server are stored and sent back on later requests, so
/// cookie-based credentials travel with every call.
pub struct HttpTransport {
    /// The underlying HTTP client
    http: Client,
    /// Whether query keys and values are form-encoded
    encode_query: bool,
}

impl HttpTransport {
    /// Creates a transport with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, encode_query: bool) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { http, encode_query })
    }

    /// Creates a transport around an existing client.
    pub fn with_client(http: Client, encode_query: bool) -> Self {
        Self { http, encode_query }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: RawRequest) -> Result<RawResponse, TransportError> {
        let method = request.method;
        let url = append_query(&request.url, &request.query, self.encode_query);

        let mut builder = self.http.request(method.into(), &url);
        let mut has_content_type = false;

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(&param_value(value))
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;

            has_content_type |= header_name == CONTENT_TYPE;
            builder = builder.header(header_name, header_value);
        }

        if let Some(payload) = &request.payload {
            let body = serde_json::to_string(payload)?;
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body);
        }

        debug!("{} {}", method, url);

        let response = builder.send().await.map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout {
                    method,
                    url: url.clone(),
                }
            } else {
                TransportError::Network {
                    method,
                    url: url.clone(),
                    source,
                }
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let body = response.text().await.map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout {
                    method,
                    url: url.clone(),
                }
            } else {
                TransportError::Network {
                    method,
                    url: url.clone(),
                    source,
                }
            }
        })?;

        debug!("{} {} -> {}", method, url, status);

        Ok(RawResponse {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}
