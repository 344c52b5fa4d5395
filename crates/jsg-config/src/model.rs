use std::fmt;
use std::str::FromStr;

use jsg_core::{codes, ErrorInfo, JsgError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target job-submission environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSystem {
    /// Slurm scheduler (`sbatch`).
    Slurm,
    /// LSF scheduler (`bsub`).
    Lsf,
    /// Sequential execution on the local machine.
    Local,
}

impl BatchSystem {
    /// Every supported batch system, in documentation order.
    pub const ALL: [BatchSystem; 3] = [BatchSystem::Slurm, BatchSystem::Lsf, BatchSystem::Local];

    /// Configuration token for this batch system.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchSystem::Slurm => "slurm",
            BatchSystem::Lsf => "lsf",
            BatchSystem::Local => "local",
        }
    }
}

impl fmt::Display for BatchSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchSystem {
    type Err = JsgError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        BatchSystem::ALL
            .into_iter()
            .find(|system| system.as_str() == token)
            .ok_or_else(|| {
                JsgError::Config(
                    ErrorInfo::new(
                        codes::UNSUPPORTED_BATCH_SYSTEM,
                        "only slurm, lsf and local are supported as batch_system",
                    )
                    .with_context("batch_system", token),
                )
            })
    }
}

/// How parameters are passed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParametersType {
    /// Parameters are not passed at all; the executable runs bare.
    None,
    /// Parameters are passed in order of their numeric position.
    Positional,
    /// Parameters are passed behind a flag such as `-n`.
    Named,
}

impl ParametersType {
    /// Configuration token for this parameter type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParametersType::None => "none",
            ParametersType::Positional => "positional",
            ParametersType::Named => "named",
        }
    }
}

impl fmt::Display for ParametersType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParametersType {
    type Err = JsgError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "none" => Ok(ParametersType::None),
            "positional" => Ok(ParametersType::Positional),
            "named" => Ok(ParametersType::Named),
            other => Err(JsgError::Config(
                ErrorInfo::new(
                    codes::UNKNOWN_PARAMETERS_TYPE,
                    "parameters_type must be none, positional or named",
                )
                .with_context("parameters_type", other),
            )),
        }
    }
}

/// Where a single parameter goes on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum Location {
    /// Not passed to the executable.
    None,
    /// One-based argument position.
    Positional(u32),
    /// Flag preceding the value.
    Named(String),
}

impl Location {
    /// Classifies a raw location value from `parameters_location`.
    ///
    /// `null` and `"none"` mean no location, a positive integer (number or
    /// numeric string) is positional, any other string is a flag. Zero,
    /// negative and fractional numbers are rejected.
    pub fn classify(value: &Value) -> Result<Location, JsgError> {
        match value {
            Value::Null => Ok(Location::None),
            Value::String(text) if text.trim() == "none" => Ok(Location::None),
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(position) => positional(position, text),
                Err(_) => Ok(Location::Named(text.clone())),
            },
            Value::Number(number) => match number.as_i64() {
                Some(position) => positional(position, &number.to_string()),
                None => Err(invalid_location(&number.to_string())),
            },
            other => Err(invalid_location(&other.to_string())),
        }
    }

    /// Parameter type implied by this location.
    pub fn kind(&self) -> ParametersType {
        match self {
            Location::None => ParametersType::None,
            Location::Positional(_) => ParametersType::Positional,
            Location::Named(_) => ParametersType::Named,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::None => f.write_str("none"),
            Location::Positional(position) => write!(f, "{position}"),
            Location::Named(flag) => f.write_str(flag),
        }
    }
}

fn positional(position: i64, raw: &str) -> Result<Location, JsgError> {
    u32::try_from(position)
        .ok()
        .filter(|position| *position > 0)
        .map(Location::Positional)
        .ok_or_else(|| invalid_location(raw))
}

fn invalid_location(raw: &str) -> JsgError {
    JsgError::Config(
        ErrorInfo::new(
            codes::INVALID_PARAMETER_LOCATION,
            "numeric parameter locations must be positive integers",
        )
        .with_context("location", raw),
    )
}

/// One `parameters_location` entry with its resolved values.
///
/// A tandem has several names under one key; `values` then holds tuples
/// with one coordinate per name, advanced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Key as written in the configuration (`"a b"` for a tandem).
    pub key: String,
    /// Parameter names, one per coordinate.
    pub names: Vec<String>,
    /// Location of each name, same length as `names`.
    pub locations: Vec<Location>,
    /// Value tuples, each of length `names.len()`.
    pub values: Vec<Vec<String>>,
}

impl ParameterSpec {
    /// Whether several names share this entry.
    pub fn is_tandem(&self) -> bool {
        self.names.len() > 1
    }

    /// Number of distinct settings this entry contributes to the product.
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }
}

/// A parameter column with its command-line location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Parameter name, used as the table column name.
    pub name: String,
    /// Where the value goes on the command line.
    pub location: Location,
}

/// One executable with its declared parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Executable as written in the configuration.
    pub executable: String,
    /// Sanitised short name of the executable.
    pub name: String,
    /// Uniform location type of every parameter.
    pub parameters_type: ParametersType,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
}

impl AlgorithmConfig {
    /// Parameter columns in canonical command-line order.
    ///
    /// Positional columns sort by position, named columns by flag text;
    /// `none` columns keep their declaration order.
    pub fn columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .parameters
            .iter()
            .flat_map(|spec| {
                spec.names
                    .iter()
                    .zip(&spec.locations)
                    .map(|(name, location)| Column {
                        name: name.clone(),
                        location: location.clone(),
                    })
            })
            .collect();
        match self.parameters_type {
            ParametersType::Positional | ParametersType::Named => {
                columns.sort_by(|a, b| a.location.cmp(&b.location))
            }
            ParametersType::None => {}
        }
        columns
    }

    /// Number of invocations the cartesian product will produce.
    pub fn expected_rows(&self) -> Option<usize> {
        self.parameters
            .iter()
            .try_fold(1usize, |acc, spec| acc.checked_mul(spec.cardinality()))
    }
}

/// Ordered scheduler directives rendered as `key`/`value` text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directives(Vec<(String, String)>);

impl Directives {
    /// Builds a directive list, preserving order.
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }

    /// Iterates directives in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Whether no directive was configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fully resolved, validated experiment description.
///
/// Built once by [`crate::parse_config`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Target batch system.
    pub batch_system: BatchSystem,
    /// `#SBATCH` directives from `slurm.sbatch`.
    pub sbatch: Directives,
    /// `#BSUB` directives from `lsf.bsub`.
    pub bsub: Directives,
    /// Algorithms that were not ignored, in configuration order.
    pub algorithms: Vec<AlgorithmConfig>,
    /// Separators declared in the document, if any.
    pub separators: Option<Vec<String>>,
}

impl ExperimentConfig {
    /// User directives for the configured batch system.
    pub fn directives(&self) -> &Directives {
        static NONE: Directives = Directives(Vec::new());
        match self.batch_system {
            BatchSystem::Slurm => &self.sbatch,
            BatchSystem::Lsf => &self.bsub,
            BatchSystem::Local => &NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locations_classify_by_shape() {
        assert_eq!(Location::classify(&json!(null)).unwrap(), Location::None);
        assert_eq!(Location::classify(&json!("none")).unwrap(), Location::None);
        assert_eq!(Location::classify(&json!(2)).unwrap(), Location::Positional(2));
        assert_eq!(Location::classify(&json!("3")).unwrap(), Location::Positional(3));
        assert_eq!(
            Location::classify(&json!("-t")).unwrap(),
            Location::Named("-t".into())
        );
    }

    #[test]
    fn non_positive_positions_are_rejected() {
        for raw in [json!(0), json!("-1"), json!(1.5), json!(true)] {
            let err = Location::classify(&raw).unwrap_err();
            assert_eq!(err.code(), codes::INVALID_PARAMETER_LOCATION);
        }
    }

    #[test]
    fn positional_locations_order_numerically() {
        let mut locations = vec![Location::Positional(10), Location::Positional(2)];
        locations.sort();
        assert_eq!(locations, [Location::Positional(2), Location::Positional(10)]);
    }

    #[test]
    fn unknown_batch_system_fails() {
        let err = "pbs".parse::<BatchSystem>().unwrap_err();
        assert_eq!(err.code(), codes::UNSUPPORTED_BATCH_SYSTEM);
        assert_eq!("lsf".parse::<BatchSystem>().unwrap(), BatchSystem::Lsf);
    }
}
