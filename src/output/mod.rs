//
//  rested-api
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Rendering for the `rested` binary:
//!
//! - **Table format**: Human-readable output for interactive terminal use
//! - **JSON format**: Machine-readable output for scripting (`--json`)
//!
//! ## Architecture
//!
//! - [`table`]: Table formatting using `comfy_table`
//! - [`json`]: JSON serialization and path selection using `serde_json`
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: The available output formats
//! - [`OutputWriter`]: Main entry point for writing formatted output
//! - [`TableOutput`]: Trait for types with a human-readable rendering
//!
//! ## Example
//!
//! ```rust,no_run
//! use rested_api::output::OutputWriter;
//!
//! let writer = OutputWriter::json();
//! writer.write(&serde_json::json!({"id": 1}))?;
//! writer.write_success("Token refreshed");
//! # Ok::<(), anyhow::Error>(())
//! ```

mod json;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;
use serde_json::Value;

use crate::api::ApiResponse;
use crate::registry::Route;

/// The available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output with optional color.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Writes values and status messages in one output format.
///
/// Color is detected from the terminal and disabled when output is piped
/// or `NO_COLOR` is set.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer for `format`.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Creates a JSON writer.
    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    /// Creates a table writer.
    pub fn table() -> Self {
        Self::new(OutputFormat::Table)
    }

    /// Picks JSON when `json` is set, table otherwise.
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::json()
        } else {
            Self::table()
        }
    }

    /// Whether color output is enabled.
    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// The configured format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes a value to stdout in the configured format.
    ///
    /// # Errors
    ///
    /// Fails if JSON serialization fails.
    pub fn write<T: Serialize + TableOutput + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value)?,
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes an error message to stderr, prefixed with `error:`.
    pub fn write_error(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    /// Writes a warning message to stderr, prefixed with `warning:`.
    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Writes an informational message to stdout.
    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Writes a success message to stdout, prefixed with a checkmark.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

/// Types with a human-readable rendering.
///
/// JSON rendering goes through [`Serialize`]; this trait covers the table
/// format.
pub trait TableOutput {
    /// Renders the value to stdout.
    fn print_table(&self, color: bool);
}

impl TableOutput for Value {
    fn print_table(&self, _color: bool) {
        match self {
            Value::String(s) => println!("{}", s),
            other => println!(
                "{}",
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
            ),
        }
    }
}

impl TableOutput for ApiResponse {
    fn print_table(&self, color: bool) {
        match self {
            ApiResponse::Parsed(value) => value.print_table(color),
            ApiResponse::Raw(raw) => {
                print_field("Status", &raw.status.to_string(), color);
                if let Some(content_type) = raw.headers.get("content-type") {
                    print_field("Content-Type", content_type, color);
                }
                if raw.has_body() {
                    println!();
                    println!("{}", raw.body);
                }
            }
        }
    }
}

impl TableOutput for [Route] {
    fn print_table(&self, color: bool) {
        if self.is_empty() {
            println!("No routes registered.");
            return;
        }

        let rows = self.iter().map(|route| {
            let methods: Vec<String> = route
                .methods
                .iter()
                .map(|m| format_method(*m, color))
                .collect();
            vec![
                route.name.clone(),
                route.path.clone(),
                methods.join(" "),
                route.exposed_names().join(", "),
            ]
        });

        TableBuilder::new()
            .color(color)
            .headers(["Name", "Path", "Methods", "Exposed"])
            .rows(rows)
            .print();
    }
}

/// Prints a bold header with a dashed underline.
pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Prints `key: value`, dimming the key when color is enabled.
pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag() {
        assert_eq!(OutputWriter::from_flag(true).format(), OutputFormat::Json);
        assert_eq!(OutputWriter::from_flag(false).format(), OutputFormat::Table);
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
