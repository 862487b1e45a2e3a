//
//  rested-api
//  registry/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Registries
//!
//! Named descriptors registered by consumers at setup time.
//!
//! - [`route`]: Path-bound endpoints, each exposing one callable per verb
//! - [`factory`]: Named producers of fresh instances or shared singletons
//!
//! Names are validated at registration. Invalid names fail synchronously and
//! leave the registry unchanged. Registering an existing name replaces the
//! previous entry; there is no removal.

pub mod factory;
pub mod route;

pub use factory::{Factory, FactoryRegistry, Producer};
pub use route::{exposed_name, Route, RouteCall, RouteOptions, RouteRegistry};

use thiserror::Error;

/// Errors raised by the route and factory registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Route names must be lower camel case (`widgets`, `widgetList`).
    #[error("Invalid route name '{0}': expected lower camel case such as 'widgetList'")]
    InvalidRouteName(String),

    /// Factory names must be upper camel case (`Widget`, `WidgetList`).
    #[error("Invalid factory name '{0}': expected upper camel case such as 'WidgetList'")]
    InvalidFactoryName(String),

    /// No route is registered under this name.
    #[error("Unknown route '{0}'")]
    UnknownRoute(String),

    /// No factory is registered under this name.
    #[error("Unknown factory '{0}'")]
    UnknownFactory(String),

    /// The name is not `get`, `post`, `put`, or `delete` followed by a registered route.
    #[error("Unknown method '{0}'")]
    UnknownExposedMethod(String),

    /// The factory produced a different type than requested.
    #[error("Factory '{name}' does not produce {expected}")]
    TypeMismatch {
        /// Factory name.
        name: String,
        /// Requested type.
        expected: &'static str,
    },

    /// The constructor rejected its arguments.
    #[error("Factory '{name}' failed to construct an instance: {message}")]
    Construction {
        /// Factory name.
        name: String,
        /// Reason given by the constructor.
        message: String,
    },
}
