//
//  rested-api
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! Everything between a route call and the wire.
//!
//! ## Architecture
//!
//! - [`transport`]: One raw HTTP exchange, status codes left uninterpreted
//! - [`client`]: Authenticated calls with merged defaults and normalized outcomes
//! - [`options`]: Client options and URL derivation
//! - [`rested`]: The [`RestedApi`] context tying client, routes, and factories together
//! - [`common`]: Shared types (verbs, responses, errors)
//!
//! ## Error Handling
//!
//! Every asynchronous failure is an [`ApiError`]:
//!
//! - `Transport`: no response arrived
//! - `Server`: status 400 or above, with the parsed body or the raw response
//! - `MethodNotAllowed`: the route does not allow the verb; nothing was sent
//! - `InvalidJson`: a successful body was not JSON while parsing is enabled
//! - `InvalidTokenResponse`: the token endpoint carried no token
//! - `Registry`: dispatch by exposed name failed
//! - `InvalidOptions`: option overrides had the wrong types

/// Authenticated API client.
pub mod client;

/// Shared verbs, response types, and errors.
pub mod common;

/// Client options.
pub mod options;

/// The client context.
pub mod rested;

/// Raw HTTP exchanges.
pub mod transport;

pub use client::ApiClient;
pub use common::{ApiError, ApiResponse, HttpMethod};
pub use options::ClientOptions;
pub use rested::{RestedApi, RouteHandle};
pub use transport::{HttpTransport, Transport};
