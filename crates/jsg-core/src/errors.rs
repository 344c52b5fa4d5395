//! Structured error types shared across jsg crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine readable codes carried in [`ErrorInfo::code`].
pub mod codes {
    /// A declared parameter has neither per-algorithm nor shared values.
    pub const MISSING_PARAMETER_VALUES: &str = "missing-parameter-values";
    /// An algorithm mixes `none`, positional and named locations.
    pub const INCONSISTENT_PARAMETER_TYPE: &str = "inconsistent-parameter-type";
    /// Paired tandem value lists resolve to different lengths.
    pub const TANDEM_LENGTH_MISMATCH: &str = "tandem-length-mismatch";
    /// A partition key is not a column of the invocation table.
    pub const INVALID_SEPARATOR: &str = "invalid-separator";
    /// `batch_system` is not one of `slurm`, `lsf`, `local`.
    pub const UNSUPPORTED_BATCH_SYSTEM: &str = "unsupported-batch-system";
    /// A separator entry is itself a list.
    pub const NESTED_SEPARATOR: &str = "nested-separator";
    /// A parameter resolved to zero values.
    pub const EMPTY_PARAMETER_VALUES: &str = "empty-parameter-values";
    /// Value list shape does not match the number of parameter names.
    pub const MALFORMED_PARAMETER_VALUES: &str = "malformed-parameter-values";
    /// A range expression carries a zero or negative step.
    pub const INVALID_RANGE_STEP: &str = "invalid-range-step";
    /// Two parameters of one algorithm share a location.
    pub const DUPLICATE_PARAMETER_LOCATION: &str = "duplicate-parameter-location";
    /// A location is numeric but not a positive integer, or has the wrong shape.
    pub const INVALID_PARAMETER_LOCATION: &str = "invalid-parameter-location";
    /// `parameters_type` override is not `none`, `positional` or `named`.
    pub const UNKNOWN_PARAMETERS_TYPE: &str = "unknown-parameters-type";
    /// The document is not valid JSON after comment stripping.
    pub const CONFIG_SYNTAX: &str = "config-syntax";
    /// The document is valid JSON but not a valid experiment description.
    pub const CONFIG_SHAPE: &str = "config-shape";
}

/// Structured payload attached to every [`JsgError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (algorithm, parameter key, path, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for job script generation.
///
/// All variants are fatal: generation aborts on the first one observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum JsgError {
    /// Configuration document and model validation errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Parameter space expansion errors.
    #[error("space error: {0}")]
    Space(ErrorInfo),
    /// Partitioning and script emission errors.
    #[error("script error: {0}")]
    Script(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl JsgError {
    /// Shorthand for a [`JsgError::Config`] with the given code and message.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        JsgError::Config(ErrorInfo::new(code, message))
    }

    /// Wraps an I/O failure, recording the path it concerned.
    pub fn io(code: &str, path: &std::path::Path, err: impl ToString) -> Self {
        JsgError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            JsgError::Config(info)
            | JsgError::Space(info)
            | JsgError::Script(info)
            | JsgError::Io(info)
            | JsgError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry to the payload regardless of family.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            JsgError::Config(info) => JsgError::Config(info.with_context(key, value)),
            JsgError::Space(info) => JsgError::Space(info.with_context(key, value)),
            JsgError::Script(info) => JsgError::Script(info.with_context(key, value)),
            JsgError::Io(info) => JsgError::Io(info.with_context(key, value)),
            JsgError::Serde(info) => JsgError::Serde(info.with_context(key, value)),
        }
    }
}
