//
//  rested-api
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Generic helpers shared by every other component of the client framework.
//!
//! ## Categories
//!
//! - **Type Introspection**: [`types`] predicates over dynamic JSON values
//! - **Object Operations**: [`object`] merge, clone, diff, and iteration
//! - **String Utilities**: [`upper_case_first`], [`slugify`], [`hash_code`],
//!   [`hash_code_in_base`]
//! - **Time Utilities**: [`now_millis`]
//!
//! ## Example
//!
//! ```rust
//! use rested_api::util::{slugify, upper_case_first};
//!
//! assert_eq!(upper_case_first("widgetList"), "WidgetList");
//! assert_eq!(slugify("Rock 'n' Roll!", None), "Rock-n-Roll-");
//! ```

pub mod object;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of characters that are not ASCII letters or digits.
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());

/// Returns the string with its first character upper-cased.
///
/// Used to derive exposed method names from route names
/// (`widgetList` becomes `getWidgetList`).
///
/// # Example
///
/// ```rust
/// use rested_api::util::upper_case_first;
///
/// assert_eq!(upper_case_first("widgets"), "Widgets");
/// assert_eq!(upper_case_first(""), "");
/// ```
pub fn upper_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts a string into a slug.
///
/// Apostrophes are dropped, then every run of characters that are not ASCII
/// letters or digits collapses into a single delimiter. Case is preserved.
///
/// # Parameters
///
/// * `s` - The input string
/// * `delimiter` - Replacement for non-alphanumeric runs, `-` when `None`
///
/// # Example
///
/// ```rust
/// use rested_api::util::slugify;
///
/// assert_eq!(slugify("Hello World", None), "Hello-World");
/// assert_eq!(slugify("a  b__c", Some("_")), "a_b_c");
/// ```
pub fn slugify(s: &str, delimiter: Option<&str>) -> String {
    let delimiter = delimiter.unwrap_or("-");
    let without_quotes = s.replace('\'', "");
    NON_ALPHANUMERIC
        .replace_all(&without_quotes, regex::NoExpand(delimiter))
        .into_owned()
}

/// Computes a 32-bit rolling hash of a string.
///
/// Each UTF-16 code unit is folded in as `hash * 31 + unit` with wrapping
/// arithmetic. The result is stable across runs and platforms, which makes it
/// suitable for deriving short identifiers from names.
///
/// # Example
///
/// ```rust
/// use rested_api::util::hash_code;
///
/// assert_eq!(hash_code(""), 0);
/// assert_eq!(hash_code("a"), 97);
/// assert_eq!(hash_code("ab"), 97 * 31 + 98);
/// ```
pub fn hash_code(s: &str) -> u32 {
    s.encode_utf16().fold(0u32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(u32::from(unit))
    })
}

/// Renders [`hash_code`] in the given base.
///
/// # Returns
///
/// `None` when `base` is outside `2..=36`.
///
/// # Example
///
/// ```rust
/// use rested_api::util::hash_code_in_base;
///
/// assert_eq!(hash_code_in_base("a", 16), Some("61".to_string()));
/// assert_eq!(hash_code_in_base("a", 1), None);
/// ```
pub fn hash_code_in_base(s: &str, base: u32) -> Option<String> {
    if !(2..=36).contains(&base) {
        return None;
    }

    let mut value = hash_code(s);
    if value == 0 {
        return Some("0".to_string());
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(std::char::from_digit(value % base, base)?);
        value /= base;
    }

    Some(digits.iter().rev().collect())
}

/// Returns the current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
