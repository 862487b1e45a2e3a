//
//  rested-api
//  api/rested.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # RestedApi
//!
//! The context object a consumer builds once at startup. It owns the API
//! client (options and token), the route registry, and the factory registry.
//! Nothing is global; pass the context (or an `Arc` of it) to whoever needs it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rested_api::api::{ClientOptions, RestedApi};
//! use rested_api::api::common::HttpMethod;
//! use rested_api::bootstrap::EnvSource;
//! use rested_api::registry::{RouteCall, RouteOptions};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut api = RestedApi::new(ClientOptions::default())?;
//! api.autoload(&EnvSource::from_env()).await?;
//!
//! api.register_route("widgets", RouteOptions {
//!     path: "/widgets".into(),
//!     methods: vec![HttpMethod::Get, HttpMethod::Post],
//!     ..Default::default()
//! })?;
//!
//! let created = api
//!     .route("widgets")?
//!     .post(RouteCall::new().payload(json!({"name": "x"})))
//!     .await?;
//!
//! // Same call, dispatched by exposed name
//! let again = api
//!     .invoke("postWidgets", RouteCall::new().payload(json!({"name": "y"})))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::client::ApiClient;
use super::common::{ApiError, ApiResponse, HttpMethod};
use super::options::ClientOptions;
use super::transport::Transport;
use crate::bootstrap::{BootstrapError, BootstrapSource, BootstrapValues};
use crate::registry::{
    Factory, FactoryRegistry, RegistryError, Route, RouteCall, RouteOptions, RouteRegistry,
};
use crate::util::object::Mapping;

/// Client context: options, token, routes, and factories.
pub struct RestedApi {
    client: ApiClient,
    routes: RouteRegistry,
    factories: FactoryRegistry,
}

impl RestedApi {
    /// Creates a context backed by the HTTP transport.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        Ok(Self::from_client(ApiClient::new(options)?))
    }

    /// Creates a context over a caller-supplied transport.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Self {
        Self::from_client(ApiClient::with_transport(options, transport))
    }

    fn from_client(client: ApiClient) -> Self {
        Self {
            client,
            routes: RouteRegistry::new(),
            factories: FactoryRegistry::new(),
        }
    }

    /// Seeds base URL, token, and CSRF marker from a source.
    ///
    /// A present base URL replaces the current one; the token and CSRF marker
    /// are replaced unconditionally, absent values clearing them.
    ///
    /// # Errors
    ///
    /// Returns the source's error. Nothing is seeded in that case.
    pub async fn bootstrap(
        &mut self,
        source: &dyn BootstrapSource,
    ) -> Result<BootstrapValues, BootstrapError> {
        let values = source.load()?;

        if let Some(base_url) = &values.base_url {
            self.client.set_base_url(base_url.clone());
        }
        self.client.tokens().set_token(values.token.clone()).await;
        self.client.tokens().set_csrf(values.csrf.clone()).await;

        info!(
            "Bootstrapped from {} source (base URL: {}, token: {}, CSRF marker: {})",
            source.name(),
            values.base_url.as_deref().unwrap_or("unchanged"),
            if values.token.is_some() { "present" } else { "absent" },
            if values.csrf.is_some() { "present" } else { "absent" },
        );

        Ok(values)
    }

    /// Runs [`RestedApi::bootstrap`] if the `autoload` option is set.
    ///
    /// # Returns
    ///
    /// Whether bootstrap ran.
    pub async fn autoload(&mut self, source: &dyn BootstrapSource) -> Result<bool, BootstrapError> {
        if !self.client.options().autoload {
            return Ok(false);
        }
        self.bootstrap(source).await?;
        Ok(true)
    }

    /// Returns the API client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns the current options.
    pub fn options(&self) -> &ClientOptions {
        self.client.options()
    }

    /// Merges option overrides shallowly. See [`ApiClient::merge_options`].
    pub fn merge_options(&mut self, overrides: &Mapping) -> Result<&ClientOptions, ApiError> {
        self.client.merge_options(overrides)
    }

    /// Performs one authenticated call outside any route.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Mapping,
        headers: &Mapping,
        payload: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.client.call(method, path, query, headers, payload).await
    }

    /// Registers a route. See [`RouteRegistry::register`].
    pub fn register_route(&mut self, name: &str, options: RouteOptions) -> Result<&Route, RegistryError> {
        self.routes.register(name, options)
    }

    /// Returns the route registry.
    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    /// Returns a handle for calling a registered route.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownRoute`] when no route has this name.
    pub fn route(&self, name: &str) -> Result<RouteHandle<'_>, RegistryError> {
        let route = self
            .routes
            .lookup(name)
            .ok_or_else(|| RegistryError::UnknownRoute(name.to_string()))?;

        Ok(RouteHandle {
            client: &self.client,
            route,
        })
    }

    /// Lists every exposed route method name.
    pub fn exposed_methods(&self) -> Vec<String> {
        self.routes.exposed_methods()
    }

    /// Calls a route method by exposed name, such as `postWidgets`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Registry`] for unknown names, otherwise as
    /// [`RouteHandle::request`].
    pub async fn invoke(&self, exposed: &str, call: RouteCall) -> Result<ApiResponse, ApiError> {
        let (route, method) = self.routes.resolve_exposed(exposed)?;
        RouteHandle {
            client: &self.client,
            route,
        }
        .request(method, call)
        .await
    }

    /// Returns the factory registry for registration.
    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    /// Returns the factory registry.
    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Returns a factory by name or by exposed name (`WidgetFactory`).
    pub fn factory(&self, name: &str) -> Result<&Factory, RegistryError> {
        self.factories.get(name)
    }

    /// Produces an instance from a factory. See [`FactoryRegistry::make`].
    pub fn make<T: Any + Send + Sync>(&self, name: &str, args: &[Value]) -> Result<Arc<T>, RegistryError> {
        self.factories.make(name, args)
    }
}

/// A registered route bound to the client that calls it.
#[derive(Clone, Copy)]
pub struct RouteHandle<'a> {
    client: &'a ApiClient,
    route: &'a Route,
}

impl<'a> RouteHandle<'a> {
    /// Returns the underlying route.
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Calls the route with `GET`. Any payload is ignored.
    pub async fn get(&self, call: RouteCall) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Get, call).await
    }

    /// Calls the route with `POST`.
    pub async fn post(&self, call: RouteCall) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Post, call).await
    }

    /// Calls the route with `PUT`.
    pub async fn put(&self, call: RouteCall) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Put, call).await
    }

    /// Calls the route with `DELETE`.
    pub async fn delete(&self, call: RouteCall) -> Result<ApiResponse, ApiError> {
        self.request(HttpMethod::Delete, call).await
    }

    /// Calls the route with any verb.
    ///
    /// Route query and headers are merged under the call's own.
    ///
    /// # Errors
    ///
    /// [`ApiError::MethodNotAllowed`] when the route does not allow `method`.
    /// No token refresh and no request happen in that case. Otherwise as
    /// [`ApiClient::call`].
    pub async fn request(&self, method: HttpMethod, call: RouteCall) -> Result<ApiResponse, ApiError> {
        if !self.route.allows(method) {
            warn!("{} is not allowed on route '{}'", method, self.route.name);
            return Err(ApiError::MethodNotAllowed {
                route: self.route.name.clone(),
                method,
            });
        }

        let path = self.route.path_with(call.path.as_deref());
        let query = self.route.query_for(&call);
        let headers = self.route.headers_for(&call);

        self.client
            .call(method, &path, &query, &headers, call.payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{DocumentSource, StaticSource};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use mockito::Matcher;
    use serde_json::json;

    fn jwt() -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp)))
    }

    async fn api(base_url: &str) -> (RestedApi, String) {
        let mut api = RestedApi::new(ClientOptions::default()).unwrap();
        let token = jwt();
        api.bootstrap(&StaticSource(BootstrapValues::new(
            Some(base_url.to_string()),
            Some(token.clone()),
            Some("csrf".into()),
        )))
        .await
        .unwrap();
        (api, token)
    }

    #[tokio::test]
    async fn test_disallowed_method_makes_no_network_call() {
        let mut server = mockito::Server::new_async().await;
        let any = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let refresh = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        // No token: a refresh would be needed if the check came too late
        let mut api = RestedApi::new(ClientOptions {
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();
        api.register_route("widgets", RouteOptions {
            path: "/widgets".into(),
            methods: vec![HttpMethod::Get],
            ..Default::default()
        })
        .unwrap();

        let err = api
            .route("widgets")
            .unwrap()
            .post(RouteCall::new().payload(json!({"name": "x"})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::MethodNotAllowed { ref route, method: HttpMethod::Post } if route == "widgets"
        ));
        any.assert_async().await;
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_route_sends_payload_with_bearer() {
        let mut server = mockito::Server::new_async().await;
        let (mut api, token) = api(&server.url()).await;
        api.register_route("widgets", RouteOptions {
            path: "/widgets".into(),
            methods: vec![HttpMethod::Get, HttpMethod::Post],
            ..Default::default()
        })
        .unwrap();

        let mock = server
            .mock("POST", "/widgets")
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "x"})))
            .with_status(201)
            .with_body(r#"{"id":1,"name":"x"}"#)
            .create_async()
            .await;

        let response = api
            .route("widgets")
            .unwrap()
            .post(RouteCall::new().payload(json!({"name": "x"})))
            .await
            .unwrap();

        assert_eq!(response.json(), Some(&json!({"id": 1, "name": "x"})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_by_exposed_name_with_sub_path_and_query() {
        let mut server = mockito::Server::new_async().await;
        let (mut api, _) = api(&server.url()).await;
        api.register_route("widgetParts", RouteOptions {
            path: "/widgets/".into(),
            methods: vec![HttpMethod::Put],
            query: json!({"v": "1", "expand": "none"}).as_object().cloned().unwrap(),
            headers: json!({"X-Route": "parts"}).as_object().cloned().unwrap(),
        })
        .unwrap();

        let mock = server
            .mock("PUT", "/widgets/7/parts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("v".into(), "1".into()),
                Matcher::UrlEncoded("expand".into(), "all".into()),
            ]))
            .match_header("x-route", "parts")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let response = api
            .invoke(
                "putWidgetParts",
                RouteCall::new()
                    .path("7/parts")
                    .query_param("expand", json!("all"))
                    .payload(json!({"n": 2})),
            )
            .await
            .unwrap();

        assert_eq!(response.json(), Some(&json!({"ok": true})));
        mock.assert_async().await;

        let err = api.invoke("patchWidgetParts", RouteCall::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Registry(RegistryError::UnknownExposedMethod(_))
        ));
    }

    #[tokio::test]
    async fn test_autoload_respects_option() {
        let html = r#"<meta name="api-base" content="https://doc.example/api">"#;

        let mut api = RestedApi::new(ClientOptions {
            autoload: false,
            ..Default::default()
        })
        .unwrap();
        assert!(!api.autoload(&DocumentSource::new(html)).await.unwrap());
        assert_eq!(api.options().base_url, "");

        let mut api = RestedApi::new(ClientOptions::default()).unwrap();
        assert!(api.autoload(&DocumentSource::new(html)).await.unwrap());
        assert_eq!(api.options().base_url, "https://doc.example/api");
        assert_eq!(
            api.client().tokens().token_url(),
            "https://doc.example/auth/token"
        );
    }

    #[tokio::test]
    async fn test_factories_through_context() {
        let mut api = RestedApi::new(ClientOptions::default()).unwrap();
        api.factories_mut()
            .register_value("Greeting", "hello".to_string())
            .unwrap();

        assert!(api.factory("GreetingFactory").is_ok());
        assert_eq!(*api.make::<String>("Greeting", &[]).unwrap(), "hello");
        assert!(api.route("missing").is_err());
    }
}
