//
//  rested-api
//  util/types.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Type Introspection
//!
//! Side-effect-free predicates over dynamic JSON values. Every other component
//! uses these to decide how a value should be treated (merged, serialized,
//! iterated) without inspecting type names at runtime.
//!
//! ## Conventions
//!
//! - An *undefined* value is an absent value: `Option::None`.
//! - `null` is defined, unless the caller asks for it to be treated as undefined.
//! - A *plain mapping* is a JSON object; a *sequence* is a JSON array.
//!
//! None of the predicates can fail. Values that cannot be coerced simply yield
//! `false`.
//!
//! ## Example
//!
//! ```rust
//! use rested_api::util::types::{is_empty, is_number, is_object};
//! use serde_json::json;
//!
//! assert!(is_object(&json!({"a": 1})));
//! assert!(is_number(&json!("42.5")));
//! assert!(is_empty(Some(&json!([]))));
//! assert!(is_empty(None));
//! ```
//!
//! Function-ness has no JSON counterpart; whether a factory producer is
//! invokable is answered by `Producer::is_function` in the registry module.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Pattern for relative or absolute URL paths with optional query and fragment.
static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/?[^/?#]*(/[^/?#]+)*/?(\?[^#]*)?(#.*)?$").unwrap()
});

/// Tests whether a value is undefined.
///
/// # Parameters
///
/// * `x` - The value, `None` when absent
/// * `treat_null_as_undefined` - When `true`, `null` also counts as undefined
///
/// # Example
///
/// ```rust
/// use rested_api::util::types::is_undefined;
/// use serde_json::Value;
///
/// assert!(is_undefined(None, false));
/// assert!(!is_undefined(Some(&Value::Null), false));
/// assert!(is_undefined(Some(&Value::Null), true));
/// ```
pub fn is_undefined(x: Option<&Value>, treat_null_as_undefined: bool) -> bool {
    match x {
        None => true,
        Some(Value::Null) => treat_null_as_undefined,
        Some(_) => false,
    }
}

/// Tests whether a value is defined. Inverse of [`is_undefined`].
pub fn is_defined(x: Option<&Value>, treat_null_as_undefined: bool) -> bool {
    !is_undefined(x, treat_null_as_undefined)
}

/// Tests whether a value is a sequence.
pub fn is_array(x: &Value) -> bool {
    x.is_array()
}

/// Tests whether a value is a plain mapping (not a sequence, not a scalar).
pub fn is_object(x: &Value) -> bool {
    x.is_object()
}

/// Tests whether a value is a string.
///
/// When `allow_stringable` is set, any non-null value qualifies, since every
/// JSON scalar and container has a textual rendering.
pub fn is_string(x: &Value, allow_stringable: bool) -> bool {
    match x {
        Value::String(_) => true,
        Value::Null => false,
        _ => allow_stringable,
    }
}

/// Coerces a value to a number.
///
/// Numbers convert directly, booleans become `0`/`1`, and strings are parsed
/// after trimming. Everything else, and any result that is NaN, yields `None`.
///
/// # Example
///
/// ```rust
/// use rested_api::util::types::to_number;
/// use serde_json::json;
///
/// assert_eq!(to_number(&json!(" 12 ")), Some(12.0));
/// assert_eq!(to_number(&json!(true)), Some(1.0));
/// assert_eq!(to_number(&json!("twelve")), None);
/// assert_eq!(to_number(&json!({})), None);
/// ```
pub fn to_number(x: &Value) -> Option<f64> {
    let number = match x {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            // Rust accepts "inf"/"nan" spellings that are not numeric literals
            if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    number.filter(|n| !n.is_nan())
}

/// Tests whether numeric coercion of a value fails.
pub fn is_nan(x: &Value) -> bool {
    to_number(x).is_none()
}

/// Tests whether a value is a number or coerces to one.
pub fn is_number(x: &Value) -> bool {
    !is_nan(x)
}

/// Tests whether a value is usable as an index.
///
/// The value must coerce to a non-negative number. When a sequence is given,
/// it must also be strictly less than the sequence length.
///
/// # Example
///
/// ```rust
/// use rested_api::util::types::is_valid_index;
/// use serde_json::json;
///
/// let items = vec![json!("a"), json!("b")];
/// assert!(is_valid_index(&json!(1), Some(items.as_slice())));
/// assert!(!is_valid_index(&json!(2), Some(items.as_slice())));
/// assert!(!is_valid_index(&json!(-1), None));
/// assert!(is_valid_index(&json!("7"), None));
/// ```
pub fn is_valid_index(n: &Value, sequence: Option<&[Value]>) -> bool {
    let Some(index) = to_number(n) else {
        return false;
    };

    if index < 0.0 {
        return false;
    }

    match sequence {
        Some(items) => index < items.len() as f64,
        None => true,
    }
}

/// Tests whether a value is empty.
///
/// Empty values are: undefined, `null`, zero, an empty sequence, an empty
/// string, or a mapping without keys. `false` is not empty.
pub fn is_empty(x: Option<&Value>) -> bool {
    match x {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_)) => false,
    }
}

/// Tests whether a string is a well-formed URL path.
///
/// Accepts an optional leading slash, slash-separated segments, an optional
/// trailing slash, a query string, and a fragment.
///
/// # Example
///
/// ```rust
/// use rested_api::util::types::is_valid_path;
///
/// assert!(is_valid_path("/widgets/12?full=1#top"));
/// assert!(is_valid_path("widgets"));
/// assert!(!is_valid_path("/widgets//12"));
/// ```
pub fn is_valid_path(p: &str) -> bool {
    PATH_PATTERN.is_match(p)
}

/// Returns a short name for the kind of a value, used in error messages.
pub fn type_name(x: &Value) -> &'static str {
    match x {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_undefined_and_null() {
        assert!(is_undefined(None, false));
        assert!(is_defined(Some(&Value::Null), false));
        assert!(!is_defined(Some(&Value::Null), true));
        assert!(is_defined(Some(&json!(0)), true));
    }

    #[test]
    fn test_array_and_object_are_distinct() {
        assert!(is_array(&json!([1, 2])));
        assert!(!is_object(&json!([1, 2])));
        assert!(is_object(&json!({})));
        assert!(!is_array(&json!({})));
        assert!(!is_object(&json!("{}")));
    }

    #[test]
    fn test_is_string() {
        assert!(is_string(&json!("x"), false));
        assert!(!is_string(&json!(5), false));
        assert!(is_string(&json!(5), true));
        assert!(!is_string(&Value::Null, true));
    }

    #[test]
    fn test_numeric_coercion() {
        assert!(is_number(&json!(3)));
        assert!(is_number(&json!("3.5")));
        assert!(is_number(&json!("1e3")));
        assert!(!is_number(&json!("abc")));
        assert!(!is_number(&json!("inf")));
        assert!(!is_number(&json!("NaN")));
        assert!(!is_number(&json!([1])));
        assert!(is_nan(&Value::Null));
    }

    #[test]
    fn test_valid_index() {
        let items = vec![json!(1)];
        assert!(is_valid_index(&json!(0), Some(items.as_slice())));
        assert!(!is_valid_index(&json!(1), Some(items.as_slice())));
        assert!(!is_valid_index(&json!("x"), None));
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(is_empty(Some(&json!(0))));
        assert!(is_empty(Some(&json!(0.0))));
        assert!(is_empty(Some(&json!(""))));
        assert!(is_empty(Some(&json!([]))));
        assert!(is_empty(Some(&json!({}))));
        assert!(!is_empty(Some(&json!(false))));
        assert!(!is_empty(Some(&json!({"a": null}))));
        assert!(!is_empty(Some(&json!(" "))));
    }

    #[test]
    fn test_valid_path() {
        assert!(is_valid_path("/"));
        assert!(is_valid_path("/a/b/"));
        assert!(is_valid_path("a/b?x=1"));
        assert!(!is_valid_path("/a//b"));
    }
}
