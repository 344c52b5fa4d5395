//! Marker lines echoed by generated scripts ahead of each invocation.
//!
//! A script first echoes the column names of an algorithm behind
//! [`PARAM_INFO`], then before every invocation the concrete values behind
//! [`PARAM_VALUE`]. Executables may tag their own measurements with
//! [`PROGRAM_OUTPUT`]. Log collectors correlate the three by order.

/// Prefix of the line naming the columns of the following invocations.
pub const PARAM_INFO: &str = "@##";
/// Prefix of the line carrying the values of the next invocation.
pub const PARAM_VALUE: &str = "@@#";
/// Prefix executables use for measurement lines.
pub const PROGRAM_OUTPUT: &str = "@@@";

/// A classified line from a generated script's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditLine {
    /// Column names, executable first.
    ParamInfo(Vec<String>),
    /// Values of one invocation, executable first.
    ParamValue(Vec<String>),
    /// Payload of a measurement line, marker stripped.
    ProgramOutput(String),
}

/// Classifies one line of script output; unmarked lines yield `None`.
pub fn parse_audit_line(line: &str) -> Option<AuditLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(rest) = strip_marker(line, PARAM_INFO) {
        return Some(AuditLine::ParamInfo(fields(rest)));
    }
    if let Some(rest) = strip_marker(line, PARAM_VALUE) {
        return Some(AuditLine::ParamValue(fields(rest)));
    }
    strip_marker(line, PROGRAM_OUTPUT).map(|rest| AuditLine::ProgramOutput(rest.trim().to_string()))
}

fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn fields(rest: &str) -> Vec<String> {
    rest.split_whitespace().map(str::to_string).collect()
}

/// Renders a marked line without the surrounding `echo`.
pub(crate) fn marked(marker: &str, fields: &str) -> String {
    if fields.is_empty() {
        marker.to_string()
    } else {
        format!("{marker} {fields}")
    }
}
