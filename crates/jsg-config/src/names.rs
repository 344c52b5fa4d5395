//! Filesystem-safe tokens derived from executables and parameter values.

/// Data file extensions dropped from the end of a name, checked in this order.
const DATA_EXTENSIONS: [&str; 4] = ["el", "txt", "dat", "csv"];

/// Extracts a short, filesystem-safe name from a path-like value.
///
/// Takes the last path component, drops a trailing data-file extension and
/// maps every character outside `[A-Za-z0-9_-]` (dots included) to `_`.
pub fn extract_name(arg: &str) -> String {
    let mut name = arg.rsplit('/').next().unwrap_or(arg).to_string();
    for ext in DATA_EXTENSIONS {
        let suffix = format!(".{ext}");
        if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
            name = stripped.to_string();
        }
    }
    let sanitized: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "empty".to_string()
    } else {
        sanitized
    }
}
