//
//  rested-api
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output
//!
//! Tables for route listings and configuration values, built on `comfy_table`
//! with UTF-8 borders and dynamic column widths.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::api::HttpMethod;

/// Creates an empty table with the standard preset.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fluent builder for tables.
///
/// Headers are cyan when color is enabled. Color support is detected from
/// the terminal on creation; [`TableBuilder::color`] overrides it.
///
/// # Example
///
/// ```rust
/// use rested_api::output::TableBuilder;
///
/// let table = TableBuilder::new()
///     .color(false)
///     .headers(["Name", "Path"])
///     .row(["widgets", "/widgets"])
///     .build();
///
/// assert!(table.to_string().contains("/widgets"));
/// ```
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    /// Creates a builder with no headers and detected color support.
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    /// Sets whether color output is enabled.
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the table headers. Call before adding rows.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    /// Adds one row.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(|s| s.into()).collect();
        self.table.add_row(row);
        self
    }

    /// Adds several rows.
    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    /// Prints the table to stdout.
    pub fn print(self) {
        println!("{}", self.table);
    }

    /// Returns the underlying table.
    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats an HTTP verb, colored by its effect when `color` is set.
///
/// - **Green**: GET
/// - **Blue**: POST
/// - **Yellow**: PUT
/// - **Red**: DELETE
pub fn format_method(method: HttpMethod, color: bool) -> String {
    if !color {
        return method.as_str().to_string();
    }

    use console::style;
    let name = method.as_str();
    match method {
        HttpMethod::Get => style(name).green().to_string(),
        HttpMethod::Post => style(name).blue().to_string(),
        HttpMethod::Put => style(name).yellow().to_string(),
        HttpMethod::Delete => style(name).red().to_string(),
    }
}

/// Formats a boolean as `Yes` or `No`.
///
/// ```rust
/// use rested_api::output::format_bool;
///
/// assert_eq!(format_bool(true, false), "Yes");
/// assert_eq!(format_bool(false, false), "No");
/// ```
pub fn format_bool(value: bool, color: bool) -> String {
    if color {
        use console::style;
        if value {
            style("Yes").green().to_string()
        } else {
            style("No").dim().to_string()
        }
    } else if value {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

/// Truncates to `max_len` characters, ending in `...` when there is room.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }

    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_format_method_plain() {
        assert_eq!(format_method(HttpMethod::Delete, false), "DELETE");
        assert!(format_method(HttpMethod::Get, true).contains("GET"));
    }

    #[test]
    fn test_builder_renders_rows() {
        let table = TableBuilder::new()
            .color(false)
            .headers(["Key", "Value"])
            .rows(vec![vec!["base_url", "http://h"], vec!["autoload", "true"]])
            .build()
            .to_string();

        assert!(table.contains("Key"));
        assert!(table.contains("http://h"));
        assert!(table.contains("autoload"));
    }
}
