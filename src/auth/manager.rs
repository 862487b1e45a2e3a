//
//  rested-api
//  auth/manager.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Token Manager
//!
//! Owns the single active bearer token and the CSRF marker used to refresh it.
//!
//! [`TokenManager::get_valid_token`] returns the cached token while it is
//! valid. Otherwise it issues `GET <token endpoint>` with an `X-CSRF-TOKEN`
//! header and reads the new token from the `data` field of the JSON body.
//!
//! ## Concurrent Refreshes
//!
//! By default concurrent callers that all find the token expired each trigger
//! their own refresh. With single-flight enabled, callers queue on a gate and
//! re-check the cache once they hold it, so only the first one fetches.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::token::Token;
use crate::api::common::{ApiError, Envelope, ErrorBody, HttpMethod};
use crate::api::transport::{RawRequest, Transport};

/// Header carrying the CSRF marker on refresh exchanges.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Default token endpoint path, resolved against the API origin.
pub const TOKEN_PATH: &str = "/auth/token";

/// Caches the bearer token and refreshes it on demand.
pub struct TokenManager {
    /// Current token, replaced as a whole on refresh
    token: RwLock<Option<Token>>,
    /// CSRF marker sent on refresh
    csrf: RwLock<Option<String>>,
    /// Absolute URL of the token endpoint
    token_url: String,
    /// Transport used for refresh exchanges
    transport: Arc<dyn Transport>,
    /// Present when refreshes are single-flight
    refresh_gate: Option<Mutex<()>>,
}

impl TokenManager {
    /// Creates a manager with no token and no CSRF marker.
    ///
    /// # Parameters
    ///
    /// * `transport` - Transport used for refresh exchanges
    /// * `token_url` - Absolute URL of the token endpoint
    pub fn new(transport: Arc<dyn Transport>, token_url: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(None),
            csrf: RwLock::new(None),
            token_url: token_url.into(),
            transport,
            refresh_gate: None,
        }
    }

    /// Enables or disables single-flight refresh.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.refresh_gate = enabled.then(|| Mutex::new(()));
        self
    }

    /// Returns the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Points refreshes at a different endpoint.
    pub fn set_token_url(&mut self, token_url: impl Into<String>) {
        self.token_url = token_url.into();
    }

    /// Replaces the cached token. Empty strings clear it.
    pub async fn set_token(&self, value: Option<String>) {
        let token = value.filter(|v| !v.is_empty()).map(Token::new);
        *self.token.write().await = token;
    }

    /// Replaces the CSRF marker. Empty strings clear it.
    pub async fn set_csrf(&self, csrf: Option<String>) {
        *self.csrf.write().await = csrf.filter(|v| !v.is_empty());
    }

    /// Returns a snapshot of the cached token, valid or not.
    pub async fn current(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    /// Returns the cached token if it is still valid.
    async fn cached_valid(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|token| !token.is_expired())
            .map(|token| token.value().to_string())
    }

    /// Returns a valid bearer token, refreshing it first if needed.
    ///
    /// # Errors
    ///
    /// Refresh failures propagate unchanged:
    ///
    /// - [`ApiError::Transport`] when the token endpoint is unreachable
    /// - [`ApiError::Server`] when it answers with a status of 400 or above
    /// - [`ApiError::InvalidTokenResponse`] when the body carries no token
    pub async fn get_valid_token(&self) -> Result<String, ApiError> {
        if let Some(value) = self.cached_valid().await {
            return Ok(value);
        }

        match &self.refresh_gate {
            Some(gate) => {
                let _guard = gate.lock().await;
                if let Some(value) = self.cached_valid().await {
                    debug!("Token refreshed by a concurrent caller");
                    return Ok(value);
                }
                self.refresh().await
            }
            None => self.refresh().await,
        }
    }

    /// Fetches a new token unconditionally and caches it.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::get_valid_token`].
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let mut request = RawRequest::new(HttpMethod::Get, self.token_url.clone());
        if let Some(csrf) = self.csrf.read().await.clone() {
            request = request.header(CSRF_HEADER, csrf);
        }

        info!("Refreshing bearer token from {}", self.token_url);
        let response = self.transport.request(request).await?;

        if response.is_error() {
            warn!("Token endpoint answered {}", response.status);
            let body = match response.json() {
                Ok(json) if response.has_body() => ErrorBody::Parsed(json),
                _ => ErrorBody::Raw(response.clone()),
            };
            return Err(ApiError::Server {
                status: response.status,
                body,
            });
        }

        let envelope: Envelope<Value> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidTokenResponse(e.to_string()))?;

        let value = match envelope.data {
            Value::String(s) if !s.is_empty() => s,
            other => {
                return Err(ApiError::InvalidTokenResponse(format!(
                    "expected a token string in 'data', found {}",
                    crate::util::types::type_name(&other)
                )))
            }
        };

        let token = Token::new(value.clone());
        match token.expires_at() {
            Some(at) => debug!("New token expires at {}", at),
            None => warn!("New token carries no decodable expiry"),
        }
        *self.token.write().await = Some(token);

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::HttpTransport;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn jwt(exp_secs: i64) -> String {
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp_secs));
        format!("e30.{}.sig", claims)
    }

    fn manager(url: String) -> TokenManager {
        let transport = HttpTransport::new(Duration::from_secs(5), false).unwrap();
        TokenManager::new(Arc::new(transport), url)
    }

    #[tokio::test]
    async fn test_valid_token_is_reused_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/token")
            .expect(0)
            .create_async()
            .await;

        let fresh = jwt(chrono::Utc::now().timestamp() + 3600);
        let tokens = manager(format!("{}/auth/token", server.url()));
        tokens.set_token(Some(fresh.clone())).await;

        assert_eq!(assert_ok!(tokens.get_valid_token().await), fresh);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_with_csrf() {
        let mut server = mockito::Server::new_async().await;
        let fresh = jwt(chrono::Utc::now().timestamp() + 3600);
        let mock = server
            .mock("GET", "/auth/token")
            .match_header("x-csrf-token", "csrf-123")
            .with_status(200)
            .with_body(json!({ "data": fresh }).to_string())
            .expect(1)
            .create_async()
            .await;

        let tokens = manager(format!("{}/auth/token", server.url()));
        tokens
            .set_token(Some(jwt(chrono::Utc::now().timestamp() + 2)))
            .await;
        tokens.set_csrf(Some("csrf-123".into())).await;

        assert_eq!(tokens.get_valid_token().await.unwrap(), fresh);
        // Second call is served from the cache
        assert_eq!(tokens.get_valid_token().await.unwrap(), fresh);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_server_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/token")
            .with_status(419)
            .with_body(r#"{"error":"csrf mismatch"}"#)
            .create_async()
            .await;

        let tokens = manager(format!("{}/auth/token", server.url()));
        let err = tokens.get_valid_token().await.unwrap_err();

        assert_eq!(err.status(), Some(419));
        assert_eq!(err.body(), Some(&json!({"error": "csrf mismatch"})));
        assert!(tokens.current().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_data_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(r#"{"data": null}"#)
            .create_async()
            .await;

        let tokens = manager(format!("{}/auth/token", server.url()));
        let err = assert_err!(tokens.get_valid_token().await);
        assert!(matches!(err, ApiError::InvalidTokenResponse(_)));
    }

    #[tokio::test]
    async fn test_single_flight_refreshes_once() {
        let mut server = mockito::Server::new_async().await;
        let fresh = jwt(chrono::Utc::now().timestamp() + 3600);
        let mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(json!({ "data": fresh }).to_string())
            .expect(1)
            .create_async()
            .await;

        let tokens = Arc::new(
            manager(format!("{}/auth/token", server.url())).with_single_flight(true),
        );

        let (a, b, c) = tokio::join!(
            tokens.get_valid_token(),
            tokens.get_valid_token(),
            tokens.get_valid_token()
        );
        assert_eq!(a.unwrap(), fresh);
        assert_eq!(b.unwrap(), fresh);
        assert_eq!(c.unwrap(), fresh);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_without_single_flight() {
        let mut server = mockito::Server::new_async().await;
        let fresh = jwt(chrono::Utc::now().timestamp() + 3600);
        let mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(json!({ "data": fresh }).to_string())
            .expect(2)
            .create_async()
            .await;

        let tokens = manager(format!("{}/auth/token", server.url()));

        let (a, b) = tokio::join!(tokens.get_valid_token(), tokens.get_valid_token());
        assert_eq!(assert_ok!(a), fresh);
        assert_eq!(assert_ok!(b), fresh);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_token_clears_cache() {
        let tokens = manager("http://127.0.0.1:1/auth/token".into());
        tokens.set_token(Some(jwt(i64::from(i32::MAX)))).await;
        assert!(tokens.current().await.is_some());

        tokens.set_token(Some(String::new())).await;
        assert!(tokens.current().await.is_none());
    }
}
