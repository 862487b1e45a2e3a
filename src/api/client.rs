//
//  rested-api
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authenticated API Client
//!
//! Composes the token manager, the object operations, and the transport into
//! one authenticated call.
//!
//! ## Call Pipeline
//!
//! 1. Prefix the path with the base URL
//! 2. Obtain a valid bearer token (possibly refreshing it)
//! 3. Merge base query and headers under the call's own (call site wins)
//! 4. Inject `Authorization: Bearer <token>`
//! 5. Send through the transport
//! 6. Normalize: status 400 and above becomes [`ApiError::Server`], anything
//!    else becomes an [`ApiResponse`]
//!
//! No step is retried.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::common::{ApiError, ApiResponse, ErrorBody, HttpMethod, RawResponse};
use super::options::ClientOptions;
use super::transport::{HttpTransport, RawRequest, Transport};
use crate::auth::{bearer, TokenManager};
use crate::util::object::{merge, Mapping};

/// Extracts a human-readable message from an API error.
///
/// Error bodies come in a few common shapes:
///
/// ```json
/// {"error": "not found"}
/// {"error": {"message": "not found"}}
/// {"errors": [{"message": "not found"}]}
/// {"message": "not found"}
/// ```
///
/// The first match wins. Bodies that match none of these, and errors that are
/// not server errors, fall back to the error's own display text.
///
/// # Example
///
/// ```rust
/// use rested_api::api::client::error_message;
/// use rested_api::api::common::{ApiError, ErrorBody};
/// use serde_json::json;
///
/// let err = ApiError::Server {
///     status: 404,
///     body: ErrorBody::Parsed(json!({"error": "not found"})),
/// };
/// assert_eq!(error_message(&err), "not found");
/// ```
pub fn error_message(err: &ApiError) -> String {
    let Some(json) = err.body() else {
        return err.to_string();
    };

    if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
        return message.to_string();
    }

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return message.to_string();
    }

    if let Some(message) = json
        .get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return message.to_string();
    }

    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }

    err.to_string()
}

/// Turns a completed exchange into the call outcome.
///
/// # Parameters
///
/// * `response` - The raw response
/// * `parse` - Whether bodies are parsed as JSON
///
/// # Returns
///
/// For status 400 and above, [`ApiError::Server`] carrying the parsed body
/// when parsing is enabled and the body is JSON, else the raw response.
/// Otherwise the parsed body when parsing is enabled and a body is present,
/// else the raw response.
///
/// # Errors
///
/// [`ApiError::InvalidJson`] when a successful response has a non-JSON body
/// and parsing is enabled.
pub fn normalize_response(response: RawResponse, parse: bool) -> Result<ApiResponse, ApiError> {
    let status = response.status;

    if response.is_error() {
        let body = match response.json() {
            Ok(json) if parse && response.has_body() => ErrorBody::Parsed(json),
            _ => ErrorBody::Raw(response),
        };
        return Err(ApiError::Server { status, body });
    }

    if parse && response.has_body() {
        return response
            .json()
            .map(ApiResponse::Parsed)
            .map_err(|source| ApiError::InvalidJson { status, source });
    }

    Ok(ApiResponse::Raw(response))
}

/// Authenticated client for one API.
///
/// Options are read on every call. Mutate them during setup, before calls
/// are in flight; `&mut self` enforces that for a client that is not shared.
///
/// # Example
///
/// ```rust,no_run
/// use rested_api::api::{ApiClient, ClientOptions};
/// use rested_api::api::common::HttpMethod;
/// use rested_api::util::object::Mapping;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = ApiClient::new(ClientOptions {
///     base_url: "https://example.com/api".into(),
///     ..Default::default()
/// })?;
///
/// let widgets = client
///     .call(HttpMethod::Get, "/widgets", &Mapping::new(), &Mapping::new(), None)
///     .await?;
/// println!("{:?}", widgets.json());
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    /// Current options
    options: ClientOptions,
    /// Bearer token owner
    tokens: TokenManager,
    /// Transport shared with the token manager
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Creates a client backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(
            Duration::from_secs(options.timeout_secs),
            options.encode_query,
        )?;
        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Self {
        let tokens = TokenManager::new(transport.clone(), options.token_endpoint())
            .with_single_flight(options.single_flight_refresh);

        Self {
            options,
            tokens,
            transport,
        }
    }

    /// Returns the current options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Merges option overrides shallowly into the current options.
    ///
    /// The token endpoint follows a changed `base_url` or `token_url`.
    /// `timeout_secs`, `encode_query`, and `single_flight_refresh` are read
    /// when the client is built and do not change an existing client.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidOptions`] when an override has the wrong type. The
    /// current options are left untouched.
    pub fn merge_options(&mut self, overrides: &Mapping) -> Result<&ClientOptions, ApiError> {
        let merged = self
            .options
            .merged(overrides)
            .map_err(ApiError::InvalidOptions)?;

        self.tokens.set_token_url(merged.token_endpoint());
        self.options = merged;
        Ok(&self.options)
    }

    /// Replaces the base URL. The token endpoint follows it.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.options.base_url = base_url.into();
        self.tokens.set_token_url(self.options.token_endpoint());
    }

    /// Returns the token manager.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Performs one authenticated call.
    ///
    /// # Parameters
    ///
    /// * `method` - Request verb
    /// * `path` - Path appended to the base URL
    /// * `query` - Query parameters, merged over the base query
    /// * `headers` - Headers, merged over the base headers
    /// * `payload` - JSON body; dropped for `GET`
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when no response arrived (for the call or the token refresh)
    /// - [`ApiError::Server`] when the call or the token refresh answered 400 or above
    /// - [`ApiError::InvalidTokenResponse`] when the refresh carried no token
    /// - [`ApiError::InvalidJson`] when parsing is enabled and a successful body is not JSON
    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Mapping,
        headers: &Mapping,
        payload: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.options.url_for(path);
        let token = self.tokens.get_valid_token().await?;

        let mut merged_query = Mapping::new();
        merge(false, &mut merged_query, [&self.options.base_query, query]);

        let mut merged_headers = Mapping::new();
        merge(false, &mut merged_headers, [&self.options.base_headers, headers]);
        merged_headers.retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
        merged_headers.insert("Authorization".to_string(), Value::String(bearer(&token)));

        let payload = payload.filter(|_| method.sends_body());

        let request = RawRequest::new(method, url)
            .query(merged_query)
            .headers(merged_headers)
            .payload(payload);

        let response = self.transport.request(request).await?;
        debug!("{} {} answered {}", method, path, response.status);

        normalize_response(response, self.options.parse_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use mockito::Matcher;
    use serde_json::json;

    fn jwt() -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp)))
    }

    fn mapping(value: Value) -> Mapping {
        value.as_object().cloned().unwrap_or_default()
    }

    async fn client(base_url: String, parse_response: bool) -> (ApiClient, String) {
        let client = ApiClient::new(ClientOptions {
            base_url,
            parse_response,
            base_query: mapping(json!({"lang": "en", "page": 1})),
            base_headers: mapping(json!({"X-App": "rested"})),
            ..Default::default()
        })
        .unwrap();

        let token = jwt();
        client.tokens().set_token(Some(token.clone())).await;
        (client, token)
    }

    #[test]
    fn test_normalize_error_with_parsed_body() {
        let response = RawResponse {
            status: 404,
            body: r#"{"error":"not found"}"#.into(),
            ..Default::default()
        };

        let err = normalize_response(response, true).unwrap_err();
        assert_eq!(err.body(), Some(&json!({"error": "not found"})));
    }

    #[test]
    fn test_normalize_error_without_parsing_keeps_raw() {
        let response = RawResponse {
            status: 500,
            body: r#"{"error":"boom"}"#.into(),
            ..Default::default()
        };

        match normalize_response(response, false) {
            Err(ApiError::Server {
                status: 500,
                body: ErrorBody::Raw(raw),
            }) => assert_eq!(raw.body, r#"{"error":"boom"}"#),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_success() {
        let empty = RawResponse {
            status: 204,
            ..Default::default()
        };
        assert!(normalize_response(empty, true).unwrap().raw().is_some());

        let html = RawResponse {
            status: 200,
            body: "<html>".into(),
            ..Default::default()
        };
        assert!(matches!(
            normalize_response(html, true),
            Err(ApiError::InvalidJson { status: 200, .. })
        ));
    }

    #[test]
    fn test_error_message_shapes() {
        let server = |body: Value| ApiError::Server {
            status: 400,
            body: ErrorBody::Parsed(body),
        };

        assert_eq!(error_message(&server(json!({"error": {"message": "a"}}))), "a");
        assert_eq!(error_message(&server(json!({"errors": [{"message": "b"}]}))), "b");
        assert_eq!(error_message(&server(json!({"message": "c"}))), "c");
        assert!(error_message(&server(json!({"x": 1}))).contains("400"));
    }

    #[tokio::test]
    async fn test_post_sends_body_and_bearer() {
        let mut server = mockito::Server::new_async().await;
        let (client, token) = client(server.url(), true).await;

        let mock = server
            .mock("POST", "/widgets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lang".into(), "fr".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .match_header("x-app", "rested")
            .match_body(Matcher::Json(json!({"name": "x"})))
            .with_status(201)
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let response = client
            .call(
                HttpMethod::Post,
                "widgets",
                &mapping(json!({"lang": "fr"})),
                &Mapping::new(),
                Some(json!({"name": "x"})),
            )
            .await
            .unwrap();

        assert_eq!(response.json(), Some(&json!({"id": 7})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_drops_payload() {
        let mut server = mockito::Server::new_async().await;
        let (client, _) = client(server.url(), true).await;

        let mock = server
            .mock("GET", "/widgets")
            .match_query(Matcher::Any)
            .match_body("")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let response = client
            .call(
                HttpMethod::Get,
                "/widgets",
                &Mapping::new(),
                &Mapping::new(),
                Some(json!({"ignored": true})),
            )
            .await
            .unwrap();

        assert_eq!(response.json(), Some(&json!([])));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_rejects_with_parsed_body() {
        let mut server = mockito::Server::new_async().await;
        let (client, _) = client(server.url(), true).await;

        let _mock = server
            .mock("GET", "/widgets/9")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"not found"}"#)
            .create_async()
            .await;

        let err = client
            .call(HttpMethod::Get, "/widgets/9", &Mapping::new(), &Mapping::new(), None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(&json!({"error": "not found"})));
    }

    #[tokio::test]
    async fn test_parse_disabled_returns_raw() {
        let mut server = mockito::Server::new_async().await;
        let (client, _) = client(server.url(), false).await;

        let _mock = server
            .mock("GET", "/widgets")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let response = client
            .call(HttpMethod::Get, "/widgets", &Mapping::new(), &Mapping::new(), None)
            .await
            .unwrap();

        let raw = response.raw().unwrap();
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, r#"{"id": 1}"#);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_before_call() {
        let mut server = mockito::Server::new_async().await;
        let fresh = jwt();

        let token_mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(json!({ "data": fresh }).to_string())
            .expect(1)
            .create_async()
            .await;
        let call_mock = server
            .mock("DELETE", "/widgets/3")
            .match_query(Matcher::Any)
            .match_header("authorization", format!("Bearer {}", fresh).as_str())
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(ClientOptions {
            base_url: format!("{}/", server.url()),
            ..Default::default()
        })
        .unwrap();

        let response = client
            .call(HttpMethod::Delete, "/widgets/3", &Mapping::new(), &Mapping::new(), None)
            .await
            .unwrap();

        assert_eq!(response.raw().map(|r| r.status), Some(204));
        token_mock.assert_async().await;
        call_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_merge_options_moves_token_endpoint() {
        let mut client = ApiClient::new(ClientOptions::default()).unwrap();
        assert_eq!(client.tokens().token_url(), "/auth/token");

        client
            .merge_options(&mapping(json!({"base_url": "https://example.com/api"})))
            .unwrap();
        assert_eq!(client.tokens().token_url(), "https://example.com/auth/token");

        assert!(client
            .merge_options(&mapping(json!({"parse_response": "yes"})))
            .is_err());
        assert!(client.options().parse_response);
    }
}
