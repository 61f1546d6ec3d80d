//! Output formatters for statement results
//!
//! Renders the active view of a result store as a box-drawn table, JSON or CSV.

use clap::ValueEnum;
use serde_json::{Map as JsonMap, Value as JsonValue};
use streamsql_link::{Statement, StatementResultField};

use crate::error::{CLIError, Result};
use crate::store::MaterializedResultStore;

/// Maximum column width before truncation
const MAX_COLUMN_WIDTH: usize = 32;

/// Minimum column width when resizing to fit the terminal
const MIN_COLUMN_WIDTH: usize = 6;

/// Output format for non-interactive results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Formats statement results for display
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// Get terminal width, defaulting to 80 if unavailable
    pub fn terminal_width() -> usize {
        if let Some((w, _h)) = term_size::dimensions() {
            w
        } else {
            80
        }
    }

    /// Truncate a string to max width with ellipsis
    fn truncate_value(value: &str, max_width: usize) -> String {
        if value.chars().count() <= max_width {
            value.to_string()
        } else if max_width <= 3 {
            value.chars().take(max_width).collect()
        } else {
            let take = max_width - 3;
            format!("{}...", value.chars().take(take).collect::<String>())
        }
    }

    /// Format the active view of a store
    pub fn format_store(&self, store: &MaterializedResultStore) -> Result<String> {
        let headers = store.headers();
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<Vec<String>> = store
                    .iter()
                    .map(|fields| fields.iter().map(|f| f.to_string()).collect())
                    .collect();
                let mut output =
                    Self::table_lines(&headers, &rows, Self::terminal_width()).join("\n");
                let row_label = if rows.len() == 1 { "row" } else { "rows" };
                output.push_str(&format!("\n({} {})", rows.len(), row_label));
                Ok(output)
            },
            OutputFormat::Json => self.format_json(&headers, store),
            OutputFormat::Csv => Ok(self.format_csv(&headers, store)),
        }
    }

    /// Box-drawn table sized to `terminal_width`, one string per line.
    pub fn table_lines(
        headers: &[String],
        rows: &[Vec<String>],
        terminal_width: usize,
    ) -> Vec<String> {
        let mut col_widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, value) in row.iter().enumerate().take(col_widths.len()) {
                col_widths[i] = col_widths[i].max(value.chars().count());
            }
        }

        let column_count = col_widths.len();
        if column_count == 0 {
            return vec!["(no columns)".to_string()];
        }

        let border_padding = column_count * 3 + 1;
        let available = terminal_width.saturating_sub(border_padding).max(column_count);

        // Only truncate if total width exceeds available space
        let mut total_width = col_widths.iter().sum::<usize>();
        if total_width > available {
            for width in col_widths.iter_mut() {
                *width = (*width).min(MAX_COLUMN_WIDTH);
            }
            total_width = col_widths.iter().sum();

            while total_width > available {
                let shrinkable = col_widths
                    .iter()
                    .enumerate()
                    .filter(|(_, width)| **width > MIN_COLUMN_WIDTH)
                    .max_by_key(|(_, width)| **width)
                    .or_else(|| {
                        col_widths
                            .iter()
                            .enumerate()
                            .filter(|(_, width)| **width > 1)
                            .max_by_key(|(_, width)| **width)
                    })
                    .map(|(idx, _)| idx);
                match shrinkable {
                    Some(idx) => col_widths[idx] -= 1,
                    None => break,
                }
                total_width = col_widths.iter().sum();
            }
        }

        let border = |left: char, mid: char, right: char| {
            let mut line = String::new();
            line.push(left);
            for (idx, width) in col_widths.iter().enumerate() {
                line.push_str(&"─".repeat(width + 2));
                line.push(if idx == column_count - 1 { right } else { mid });
            }
            line
        };
        let cells = |values: &[String]| {
            let mut line = String::from("│");
            for (i, width) in col_widths.iter().enumerate() {
                let value = values.get(i).map(String::as_str).unwrap_or("");
                let truncated = Self::truncate_value(value, *width);
                line.push_str(&format!(" {:width$} │", truncated, width = *width));
            }
            line
        };

        let mut lines = Vec::with_capacity(rows.len() + 4);
        lines.push(border('┌', '┬', '┐'));
        lines.push(cells(headers));
        lines.push(border('├', '┼', '┤'));
        for row in rows {
            lines.push(cells(row));
        }
        lines.push(border('└', '┴', '┘'));
        lines
    }

    /// Format as JSON: an array of objects keyed by header
    fn format_json(&self, headers: &[String], store: &MaterializedResultStore) -> Result<String> {
        let rows: Vec<JsonValue> = store
            .iter()
            .map(|fields| {
                let mut object = JsonMap::new();
                for (header, field) in headers.iter().zip(fields.iter()) {
                    object.insert(header.clone(), field_to_json(field));
                }
                JsonValue::Object(object)
            })
            .collect();
        serde_json::to_string_pretty(&rows).map_err(|e| CLIError::FormatError(e.to_string()))
    }

    /// Format as CSV
    fn format_csv(&self, headers: &[String], store: &MaterializedResultStore) -> String {
        let mut output = headers
            .iter()
            .map(|h| Self::escape_csv(h))
            .collect::<Vec<_>>()
            .join(",");
        output.push('\n');

        for fields in store.iter() {
            let values: Vec<String> = fields
                .iter()
                .map(|field| {
                    if field.is_null() {
                        String::new()
                    } else {
                        Self::escape_csv(&field.to_string())
                    }
                })
                .collect();
            output.push_str(&values.join(","));
            output.push('\n');
        }

        output
    }

    /// Escape commas, quotes and newlines for CSV
    fn escape_csv(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    /// One-line statement summary for `\status`
    pub fn format_statement_status(&self, statement: &Statement) -> String {
        let mut output = format!(
            "Statement: {}\nPhase:     {}",
            statement.name,
            statement.phase().as_str()
        );
        if !statement.detail().is_empty() {
            output.push_str(&format!("\nDetail:    {}", statement.detail()));
        }
        output.push_str(&format!(
            "\nBounded:   {}",
            if statement.is_bounded() { "yes" } else { "no" }
        ));
        for column in statement.columns() {
            output.push_str(&format!(
                "\n  {} {}",
                column.name,
                column.data_type.type_string()
            ));
        }
        output
    }

    /// Error line shown by the prompt
    pub fn format_error(&self, message: &str) -> String {
        if self.color {
            format!("\x1b[31m✗ {}\x1b[0m", message)
        } else {
            format!("✗ {}", message)
        }
    }
}

/// Structured JSON for a converted field
///
/// Maps become objects keyed by the rendered key; rows become arrays.
pub fn field_to_json(field: &StatementResultField) -> JsonValue {
    match field {
        StatementResultField::Atomic { .. } if field.is_null() => JsonValue::Null,
        StatementResultField::Atomic { value, .. } => JsonValue::String(value.clone()),
        StatementResultField::Array { values, .. } | StatementResultField::Row { values, .. } => {
            JsonValue::Array(values.iter().map(field_to_json).collect())
        },
        StatementResultField::Map { entries, .. } => {
            let mut object = JsonMap::new();
            for entry in entries {
                object.insert(entry.key.to_string(), field_to_json(&entry.value));
            }
            JsonValue::Object(object)
        },
    }
}
