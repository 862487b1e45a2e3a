//
//  rested-api
//  util/object.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Object Operations
//!
//! Generic merge, clone, and diff over plain mappings, plus iteration helpers
//! over mappings and sequences. These back every configuration merge the API
//! client performs (base query under call query, base headers under call
//! headers, option overrides).
//!
//! ## Semantics
//!
//! | Operation | Mutates | Recurses into nested mappings |
//! |-----------|---------|-------------------------------|
//! | [`merge`] (shallow) | target | No, later values replace earlier ones |
//! | [`merge`] (deep) | target | Yes, mapping pairs are merged key by key |
//! | [`clone`] | - | Yes, but only for a mapping input |
//! | [`diff`] | target | No |
//!
//! Sequences are always opaque: they are replaced wholesale, never merged
//! element by element.
//!
//! ## Example
//!
//! ```rust
//! use rested_api::util::object::{merge, Mapping};
//! use serde_json::json;
//!
//! let defaults = json!({"page": 1, "filter": {"state": "open"}});
//! let overrides = json!({"filter": {"author": "me"}});
//!
//! let mut query = Mapping::new();
//! merge(
//!     true,
//!     &mut query,
//!     [defaults.as_object().unwrap(), overrides.as_object().unwrap()],
//! );
//!
//! assert_eq!(
//!     serde_json::Value::Object(query),
//!     json!({"page": 1, "filter": {"state": "open", "author": "me"}})
//! );
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::type_name;

/// A plain key-value mapping.
pub type Mapping = Map<String, Value>;

/// Errors raised by the iteration helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The subject passed to [`each`] or [`map`] is neither a sequence nor a mapping.
    #[error("Iterator requires an array or object, got {0}")]
    NotIterable(&'static str),
}

/// Position of an element visited by [`each`] or [`map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    /// Position within a sequence.
    Index(usize),
    /// Key within a mapping.
    Key(&'a str),
}

/// Copies every key of each source into `target`, later sources winning.
///
/// With `deep` set, a source value that is itself a mapping is merged into
/// the mapping already present at that key (or into a fresh copy when the key
/// holds anything else) instead of replacing it. Sequences and scalars are
/// always replaced.
///
/// # Parameters
///
/// * `deep` - Whether nested mappings are merged recursively
/// * `target` - The mapping to write into
/// * `sources` - Mappings applied in order
///
/// # Returns
///
/// The same `target`, for chaining.
///
/// # Example
///
/// ```rust
/// use rested_api::util::object::{merge, Mapping};
/// use serde_json::json;
///
/// let a = json!({"opts": {"x": 1}, "keep": true});
/// let b = json!({"opts": {"y": 2}});
///
/// let mut shallow = Mapping::new();
/// merge(false, &mut shallow, [a.as_object().unwrap(), b.as_object().unwrap()]);
/// assert_eq!(shallow["opts"], json!({"y": 2}));
/// assert_eq!(shallow["keep"], json!(true));
/// ```
pub fn merge<'t, 's, I>(deep: bool, target: &'t mut Mapping, sources: I) -> &'t mut Mapping
where
    I: IntoIterator<Item = &'s Mapping>,
{
    for source in sources {
        for (key, value) in source {
            if deep {
                if let Value::Object(nested) = value {
                    match target.get_mut(key) {
                        Some(Value::Object(existing)) => {
                            merge(true, existing, std::iter::once(nested));
                        }
                        _ => {
                            let mut fresh = Mapping::new();
                            merge(true, &mut fresh, std::iter::once(nested));
                            target.insert(key.clone(), Value::Object(fresh));
                        }
                    }
                    continue;
                }
            }

            target.insert(key.clone(), value.clone());
        }
    }

    target
}

/// Returns a deep copy of a mapping.
///
/// Equivalent to a deep [`merge`] of `original` into an empty mapping. Inputs
/// that are not mappings (sequences, scalars, `null`) produce an empty
/// mapping: this entry point only clones mappings.
///
/// # Example
///
/// ```rust
/// use rested_api::util::object::clone;
/// use serde_json::json;
///
/// let original = json!({"a": {"b": [1, 2]}});
/// let copy = clone(&original);
/// assert_eq!(serde_json::Value::Object(copy), original);
///
/// assert!(clone(&json!([1, 2, 3])).is_empty());
/// ```
pub fn clone(original: &Value) -> Mapping {
    let mut copy = Mapping::new();
    if let Value::Object(map) = original {
        merge(true, &mut copy, std::iter::once(map));
    }
    copy
}

/// Removes from `target` every key that also exists in any source.
///
/// In strict mode a key is only removed when the value in `target` equals
/// the value in the source. Equality is structural.
///
/// # Returns
///
/// The same `target`, for chaining.
///
/// # Example
///
/// ```rust
/// use rested_api::util::object::diff;
/// use serde_json::json;
///
/// let mut target = json!({"a": 1, "b": 2, "c": 3}).as_object().unwrap().clone();
/// let source = json!({"a": 1, "b": 20}).as_object().unwrap().clone();
///
/// diff(true, &mut target, [&source]);
/// assert_eq!(serde_json::Value::Object(target.clone()), json!({"b": 2, "c": 3}));
///
/// diff(false, &mut target, [&source]);
/// assert_eq!(serde_json::Value::Object(target), json!({"c": 3}));
/// ```
pub fn diff<'t, 's, I>(strict: bool, target: &'t mut Mapping, sources: I) -> &'t mut Mapping
where
    I: IntoIterator<Item = &'s Mapping>,
{
    for source in sources {
        for (key, value) in source {
            let remove = match target.get(key) {
                Some(existing) => !strict || existing == value,
                None => false,
            };

            if remove {
                target.remove(key);
            }
        }
    }

    target
}

/// Visits each element of a sequence or each entry of a mapping in order.
///
/// Iteration stops early when `callback` returns `false`.
///
/// # Errors
///
/// Returns [`ObjectError::NotIterable`] when `subject` is a scalar or `null`.
///
/// # Example
///
/// ```rust
/// use rested_api::util::object::{each, EntryKey};
/// use serde_json::json;
///
/// let mut seen = Vec::new();
/// each(&json!([10, 20, 30]), |key, value| {
///     seen.push(value.clone());
///     key != EntryKey::Index(1)
/// })?;
/// assert_eq!(seen, vec![json!(10), json!(20)]);
/// # Ok::<(), rested_api::util::object::ObjectError>(())
/// ```
pub fn each<F>(subject: &Value, mut callback: F) -> Result<(), ObjectError>
where
    F: FnMut(EntryKey<'_>, &Value) -> bool,
{
    match subject {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if !callback(EntryKey::Index(index), item) {
                    break;
                }
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, value) in map {
                if !callback(EntryKey::Key(key), value) {
                    break;
                }
            }
            Ok(())
        }
        other => Err(ObjectError::NotIterable(type_name(other))),
    }
}

/// Produces a new sequence or mapping by transforming each element.
///
/// The result has the same shape as `subject`. Elements for which `callback`
/// returns `None` are left out.
///
/// # Errors
///
/// Returns [`ObjectError::NotIterable`] when `subject` is a scalar or `null`.
pub fn map<F>(subject: &Value, mut callback: F) -> Result<Value, ObjectError>
where
    F: FnMut(EntryKey<'_>, &Value) -> Option<Value>,
{
    match subject {
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| callback(EntryKey::Index(index), item))
                .collect(),
        )),
        Value::Object(entries) => {
            let mut result = Mapping::new();
            for (key, value) in entries {
                if let Some(mapped) = callback(EntryKey::Key(key), value) {
                    result.insert(key.clone(), mapped);
                }
            }
            Ok(Value::Object(result))
        }
        other => Err(ObjectError::NotIterable(type_name(other))),
    }
}
