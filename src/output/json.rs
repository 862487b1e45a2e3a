//
//  rested-api
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output
//!
//! Pretty-printed JSON for scripting, plus a small dotted-path selector for
//! picking one field out of a response body.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`write_json`] | Pretty JSON to stdout |
//! | [`write_json_to`] | Pretty JSON to any writer |
//! | [`select_path`] | `.data.items.0.name` style extraction |

use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Writes a value as pretty-printed JSON to stdout.
///
/// # Errors
///
/// Fails if the value cannot be serialized.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Writes a value as pretty-printed JSON followed by a newline.
///
/// # Example
///
/// ```rust
/// use rested_api::output::write_json_to;
///
/// let mut buffer = Vec::new();
/// write_json_to(&mut buffer, &serde_json::json!({"key": "value"}))?;
///
/// let output = String::from_utf8(buffer)?;
/// assert!(output.contains("\"key\": \"value\""));
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Fails if serialization or the write fails.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Selects a nested value with a dotted path.
///
/// `.` selects the whole value. Segments index objects by key and arrays by
/// position.
///
/// # Example
///
/// ```rust
/// use rested_api::output::select_path;
/// use serde_json::json;
///
/// let body = json!({"data": {"items": [{"name": "gear"}]}});
/// assert_eq!(select_path(&body, ".data.items.0.name")?, &json!("gear"));
/// assert_eq!(select_path(&body, ".")?, &body);
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Fails when the path does not start with `.` or a segment is missing.
pub fn select_path<'a>(value: &'a Value, path: &str) -> anyhow::Result<&'a Value> {
    let Some(rest) = path.strip_prefix('.') else {
        anyhow::bail!("Path must start with '.': {}", path);
    };

    if rest.is_empty() {
        return Ok(value);
    }

    let mut current = value;
    for segment in rest.split('.') {
        let next = match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(segment),
            _ => None,
        };
        current = next.ok_or_else(|| anyhow::anyhow!("No value at '{}' in path {}", segment, path))?;
    }

    Ok(current)
}
