//
//  rested-api
//  registry/route.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Route Registry
//!
//! A route binds a lower-camel-case name to a path, the verbs it allows, and
//! default query parameters and headers. Every route publishes four exposed
//! names, one per verb: `getWidgetList`, `postWidgetList`, `putWidgetList`,
//! `deleteWidgetList`. Verbs outside the allowed set are still published; they
//! fail with "method not allowed" when called.
//!
//! ## Example
//!
//! ```rust
//! use rested_api::api::common::HttpMethod;
//! use rested_api::registry::{RouteOptions, RouteRegistry};
//!
//! let mut routes = RouteRegistry::new();
//! routes.register("widgetList", RouteOptions {
//!     path: "/widgets/".into(),
//!     methods: vec![HttpMethod::Get, HttpMethod::Post],
//!     ..Default::default()
//! })?;
//!
//! let route = routes.lookup("widgetList").unwrap();
//! assert_eq!(route.path, "/widgets");
//! assert!(route.allows(HttpMethod::Post));
//! assert!(!route.allows(HttpMethod::Delete));
//!
//! let (route, method) = routes.resolve_exposed("postWidgetList")?;
//! assert_eq!((route.name.as_str(), method), ("widgetList", HttpMethod::Post));
//! # Ok::<(), rested_api::registry::RegistryError>(())
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::RegistryError;
use crate::api::common::HttpMethod;
use crate::util::object::{merge, Mapping};
use crate::util::upper_case_first;

/// Lower camel case: a lower-case run followed by capitalized words.
static ROUTE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+([A-Z][a-z]*?)*$").unwrap());

/// Returns the exposed name of a route verb.
///
/// # Example
///
/// ```rust
/// use rested_api::api::common::HttpMethod;
/// use rested_api::registry::exposed_name;
///
/// assert_eq!(exposed_name(HttpMethod::Delete, "widgetList"), "deleteWidgetList");
/// ```
pub fn exposed_name(method: HttpMethod, route_name: &str) -> String {
    format!("{}{}", method.prefix(), upper_case_first(route_name))
}

/// Whether a name is a valid route name.
pub fn is_valid_route_name(name: &str) -> bool {
    ROUTE_NAME.is_match(name)
}

fn default_methods() -> Vec<HttpMethod> {
    vec![HttpMethod::Get]
}

/// Registration options for a route.
///
/// Deserializes from the `[routes.<name>]` tables of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Path relative to the base URL
    pub path: String,
    /// Allowed verbs, `[GET]` when omitted
    pub methods: Vec<HttpMethod>,
    /// Default query parameters
    pub query: Mapping,
    /// Default headers
    pub headers: Mapping,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            path: String::new(),
            methods: default_methods(),
            query: Mapping::new(),
            headers: Mapping::new(),
        }
    }
}

/// A registered route. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Unique lower-camel-case name
    pub name: String,
    /// Path without trailing slash
    pub path: String,
    /// Allowed verbs, deduplicated, in registration order
    pub methods: Vec<HttpMethod>,
    /// Default query parameters
    pub query: Mapping,
    /// Default headers
    pub headers: Mapping,
}

impl Route {
    fn new(name: &str, options: RouteOptions) -> Self {
        let path = options
            .path
            .strip_suffix('/')
            .unwrap_or(&options.path)
            .to_string();

        let mut methods = Vec::with_capacity(options.methods.len());
        for method in options.methods {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        Self {
            name: name.to_string(),
            path,
            methods,
            query: options.query,
            headers: options.headers,
        }
    }

    /// Whether the route allows a verb.
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Returns the four exposed names of this route.
    pub fn exposed_names(&self) -> Vec<String> {
        HttpMethod::ALL
            .iter()
            .map(|method| exposed_name(*method, &self.name))
            .collect()
    }

    /// Appends an optional sub-path to the route path.
    ///
    /// The sub-path gains a leading slash if it lacks one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rested_api::registry::{RouteOptions, RouteRegistry};
    ///
    /// let mut routes = RouteRegistry::new();
    /// let route = routes.register("widgets", RouteOptions {
    ///     path: "/widgets".into(),
    ///     ..Default::default()
    /// })?;
    ///
    /// assert_eq!(route.path_with(None), "/widgets");
    /// assert_eq!(route.path_with(Some("12")), "/widgets/12");
    /// assert_eq!(route.path_with(Some("/12/parts")), "/widgets/12/parts");
    /// # Ok::<(), rested_api::registry::RegistryError>(())
    /// ```
    pub fn path_with(&self, sub_path: Option<&str>) -> String {
        match sub_path.filter(|p| !p.is_empty()) {
            Some(sub) if sub.starts_with('/') => format!("{}{}", self.path, sub),
            Some(sub) => format!("{}/{}", self.path, sub),
            None => self.path.clone(),
        }
    }

    /// Merges the route defaults under a call's query parameters.
    pub fn query_for(&self, call: &RouteCall) -> Mapping {
        let mut query = Mapping::new();
        merge(false, &mut query, [&self.query, &call.query]);
        query
    }

    /// Merges the route defaults under a call's headers.
    pub fn headers_for(&self, call: &RouteCall) -> Mapping {
        let mut headers = Mapping::new();
        merge(false, &mut headers, [&self.headers, &call.headers]);
        headers
    }
}

/// Arguments of one route call.
///
/// Every field is optional. `payload` is ignored for `GET`.
///
/// # Example
///
/// ```rust
/// use rested_api::registry::RouteCall;
/// use serde_json::json;
///
/// let call = RouteCall::new()
///     .path("12")
///     .payload(json!({"name": "x"}))
///     .query_param("notify", json!(true));
///
/// assert_eq!(call.path.as_deref(), Some("12"));
/// assert_eq!(call.query.get("notify"), Some(&json!(true)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCall {
    /// Sub-path appended to the route path
    pub path: Option<String>,
    /// JSON body
    pub payload: Option<Value>,
    /// Query overrides
    pub query: Mapping,
    /// Header overrides
    pub headers: Mapping,
}

impl RouteCall {
    /// Creates an empty call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sub-path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Replaces the query overrides.
    pub fn query(mut self, query: Mapping) -> Self {
        self.query = query;
        self
    }

    /// Adds one query override.
    pub fn query_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.query.insert(key.into(), value);
        self
    }

    /// Adds one header override.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Value::String(value.into()));
        self
    }
}

/// Routes keyed by name.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: BTreeMap<String, Route>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route, replacing any route of the same name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidRouteName`] when the name is not lower camel
    /// case. The registry is left unchanged.
    pub fn register(&mut self, name: &str, options: RouteOptions) -> Result<&Route, RegistryError> {
        if !is_valid_route_name(name) {
            return Err(RegistryError::InvalidRouteName(name.to_string()));
        }

        let route = Route::new(name, options);
        debug!(
            "Registered route '{}' at '{}' ({})",
            name,
            route.path,
            route
                .methods
                .iter()
                .map(HttpMethod::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.routes.insert(name.to_string(), route);
        self.routes
            .get(name)
            .ok_or_else(|| RegistryError::UnknownRoute(name.to_string()))
    }

    /// Returns the route registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Returns every route, ordered by name.
    pub fn all(&self) -> &BTreeMap<String, Route> {
        &self.routes
    }

    /// Returns every exposed name, four per route.
    pub fn exposed_methods(&self) -> Vec<String> {
        self.routes.values().flat_map(Route::exposed_names).collect()
    }

    /// Splits an exposed name into its route and verb.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownExposedMethod`] when the name has no verb
    /// prefix or names no registered route.
    pub fn resolve_exposed(&self, exposed: &str) -> Result<(&Route, HttpMethod), RegistryError> {
        for method in HttpMethod::ALL {
            let Some(rest) = exposed.strip_prefix(method.prefix()) else {
                continue;
            };

            let mut chars = rest.chars();
            let Some(first) = chars.next().filter(char::is_ascii_uppercase) else {
                continue;
            };

            let name: String = first.to_lowercase().chain(chars).collect();
            if let Some(route) = self.routes.get(&name) {
                return Ok((route, method));
            }
        }

        Err(RegistryError::UnknownExposedMethod(exposed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(path: &str, methods: Vec<HttpMethod>) -> RouteOptions {
        RouteOptions {
            path: path.to_string(),
            methods,
            ..Default::default()
        }
    }

    #[test]
    fn test_route_name_validation() {
        let mut routes = RouteRegistry::new();
        assert!(routes.register("widgets", RouteOptions::default()).is_ok());
        assert!(routes.register("widgetList", RouteOptions::default()).is_ok());

        for bad in ["Widgets", "widget_list", "widget2", "", "WIDGETS"] {
            assert_eq!(
                routes.register(bad, RouteOptions::default()).unwrap_err(),
                RegistryError::InvalidRouteName(bad.to_string())
            );
        }
        assert_eq!(routes.all().len(), 2);
    }

    #[test]
    fn test_defaults_and_normalization() {
        let mut routes = RouteRegistry::new();
        let route = routes.register("widgets", options("/widgets/", vec![])).unwrap();
        assert_eq!(route.path, "/widgets");
        assert!(route.methods.is_empty());

        let route = routes
            .register("widgets", RouteOptions {
                path: "/w".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(route.methods, vec![HttpMethod::Get]);
        assert_eq!(routes.lookup("widgets").unwrap().path, "/w");
    }

    #[test]
    fn test_methods_deserialize_case_insensitively() {
        let options: RouteOptions = toml::from_str(
            r#"
            path = "/widgets"
            methods = ["get", "Post", "POST"]
            "#,
        )
        .unwrap();

        let mut routes = RouteRegistry::new();
        let route = routes.register("widgets", options).unwrap();
        assert_eq!(route.methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_exposed_names() {
        let mut routes = RouteRegistry::new();
        routes.register("widgetList", RouteOptions::default()).unwrap();

        assert_eq!(
            routes.exposed_methods(),
            vec![
                "getWidgetList",
                "postWidgetList",
                "putWidgetList",
                "deleteWidgetList"
            ]
        );

        let (route, method) = routes.resolve_exposed("deleteWidgetList").unwrap();
        assert_eq!(route.name, "widgetList");
        assert_eq!(method, HttpMethod::Delete);

        assert!(routes.resolve_exposed("patchWidgetList").is_err());
        assert!(routes.resolve_exposed("getwidgetList").is_err());
        assert!(routes.resolve_exposed("getOther").is_err());
    }

    #[test]
    fn test_call_merging() {
        let mut routes = RouteRegistry::new();
        let route = routes
            .register("widgets", RouteOptions {
                path: "/widgets".into(),
                query: json!({"a": 1, "b": 1}).as_object().cloned().unwrap(),
                headers: json!({"X-A": "route"}).as_object().cloned().unwrap(),
                ..Default::default()
            })
            .unwrap();

        let call = RouteCall::new()
            .query_param("b", json!(2))
            .header("X-A", "call");

        assert_eq!(Value::Object(route.query_for(&call)), json!({"a": 1, "b": 2}));
        assert_eq!(Value::Object(route.headers_for(&call)), json!({"X-A": "call"}));
        assert_eq!(route.path_with(Some("")), "/widgets");
    }
}
