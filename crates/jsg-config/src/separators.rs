//! Partition keys ("separators") from the command line or the document.

use jsg_core::{codes, ErrorInfo, JsgError};
use serde_json::Value;

/// Column every invocation table starts with.
pub const EXECUTABLE_COLUMN: &str = "executable";

/// Alias accepted for [`EXECUTABLE_COLUMN`] when splitting per algorithm.
pub const ALGORITHMS_ALIAS: &str = "algorithms";

/// Splits a whitespace-separated separator list as given on the command line.
pub fn split_separators(text: &str) -> Vec<String> {
    text.split_whitespace().map(normalize_separator).collect()
}

/// Reads the optional `separators` entry of a configuration document.
///
/// Accepts a single string (whitespace separated) or a flat list of
/// strings; a list inside the list is a [`codes::NESTED_SEPARATOR`] error.
pub fn parse_separators(value: &Value) -> Result<Vec<String>, JsgError> {
    match value {
        Value::String(text) => Ok(split_separators(text)),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(normalize_separator(name.trim())),
                Value::Array(_) => Err(JsgError::Config(
                    ErrorInfo::new(codes::NESTED_SEPARATOR, "separator cannot be a nested list")
                        .with_context("separator", item.to_string()),
                )),
                other => Err(shape_error(other)),
            })
            .collect(),
        other => Err(shape_error(other)),
    }
}

/// Maps the `algorithms` alias onto the executable column.
pub fn normalize_separator(name: &str) -> String {
    if name == ALGORITHMS_ALIAS {
        EXECUTABLE_COLUMN.to_string()
    } else {
        name.to_string()
    }
}

fn shape_error(value: &Value) -> JsgError {
    JsgError::Config(
        ErrorInfo::new(
            codes::CONFIG_SHAPE,
            "separators must be a string or a list of strings",
        )
        .with_context("separator", value.to_string()),
    )
}
