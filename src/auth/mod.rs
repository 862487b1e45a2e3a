//
//  rested-api
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Bearer-token lifecycle for the API client. Exactly one credential is active
//! at a time and it lives only in memory.
//!
//! ## Module Structure
//!
//! - [`token`]: JWT expiry decoding and the validity rule
//! - [`manager`]: The token cache and its refresh exchange
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rested_api::api::transport::HttpTransport;
//! use rested_api::auth::TokenManager;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = Arc::new(HttpTransport::new(Duration::from_secs(30), false)?);
//! let tokens = TokenManager::new(transport, "https://example.com/auth/token");
//! tokens.set_csrf(Some("csrf-marker".to_string())).await;
//!
//! let bearer = tokens.get_valid_token().await?;
//! println!("token has {} characters", bearer.len());
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod token;

pub use manager::{TokenManager, CSRF_HEADER, TOKEN_PATH};
pub use token::{decode_expiry, Token, TokenError, EXPIRY_MARGIN_MILLIS};

/// Formats a bearer `Authorization` header value.
///
/// # Example
///
/// ```rust
/// use rested_api::auth::bearer;
///
/// assert_eq!(bearer("abc"), "Bearer abc");
/// ```
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
