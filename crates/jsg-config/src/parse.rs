use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use jsg_core::{codes, ErrorInfo, JsgError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::comments::strip_comments;
use crate::model::{
    AlgorithmConfig, BatchSystem, Directives, ExperimentConfig, Location, ParameterSpec,
    ParametersType,
};
use crate::names::extract_name;
use crate::range::{render_scalar, RangeExpression, RangeFallback};
use crate::separators::{parse_separators, EXECUTABLE_COLUMN};

#[derive(Debug, Deserialize)]
struct RawExperiment {
    batch_system: String,
    #[serde(default)]
    slurm: RawSlurm,
    #[serde(default)]
    lsf: RawLsf,
    #[serde(default)]
    algorithms: Vec<RawAlgorithm>,
    #[serde(default)]
    common_parameter_values: IndexMap<String, Value>,
    #[serde(default)]
    separators: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlurm {
    #[serde(default)]
    sbatch: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLsf {
    #[serde(default)]
    bsub: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawAlgorithm {
    executable: Value,
    #[serde(default)]
    parameters_location: IndexMap<String, Value>,
    #[serde(default)]
    parameters_values: IndexMap<String, Value>,
    #[serde(default)]
    parameters_type: Option<String>,
    #[serde(default)]
    ignore: Option<Value>,
}

impl RawAlgorithm {
    fn ignored(&self) -> bool {
        match &self.ignore {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text == "true",
            _ => false,
        }
    }
}

/// Reads and parses a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig, JsgError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| JsgError::io("config-read", path, err))?;
    parse_config(&text).map_err(|err| err.with_context("config", path.display().to_string()))
}

/// Parses configuration text into a validated [`ExperimentConfig`].
///
/// Strips `//` comments, drops ignored algorithms, determines and checks
/// every algorithm's parameter type and resolves each parameter's values
/// from `parameters_values` or the shared `common_parameter_values` pool.
pub fn parse_config(text: &str) -> Result<ExperimentConfig, JsgError> {
    let stripped = strip_comments(text);
    let tree: Value = serde_json::from_str(&stripped).map_err(|err| {
        JsgError::Config(
            ErrorInfo::new(codes::CONFIG_SYNTAX, err.to_string())
                .with_context("line", err.line().to_string())
                .with_context("column", err.column().to_string()),
        )
    })?;
    let raw: RawExperiment = serde_json::from_value(tree)
        .map_err(|err| JsgError::config(codes::CONFIG_SHAPE, err.to_string()))?;

    let batch_system: BatchSystem = raw.batch_system.parse()?;
    let mut algorithms = Vec::with_capacity(raw.algorithms.len());
    for alg in &raw.algorithms {
        if alg.ignored() {
            debug!(executable = %alg.executable, "skipping ignored algorithm");
            continue;
        }
        algorithms.push(resolve_algorithm(alg, &raw.common_parameter_values)?);
    }
    let separators = raw
        .separators
        .as_ref()
        .map(parse_separators)
        .transpose()?;

    info!(
        batch_system = %batch_system,
        algorithms = algorithms.len(),
        ignored = raw.algorithms.len() - algorithms.len(),
        "parsed experiment configuration"
    );
    Ok(ExperimentConfig {
        batch_system,
        sbatch: render_directives(&raw.slurm.sbatch),
        bsub: render_directives(&raw.lsf.bsub),
        algorithms,
        separators,
    })
}

fn render_directives(map: &IndexMap<String, Value>) -> Directives {
    Directives::new(
        map.iter()
            .map(|(key, value)| {
                let text = render_scalar(value).unwrap_or_else(|| value.to_string());
                (key.clone(), text)
            })
            .collect(),
    )
}

fn resolve_algorithm(
    raw: &RawAlgorithm,
    common: &IndexMap<String, Value>,
) -> Result<AlgorithmConfig, JsgError> {
    let executable = render_scalar(&raw.executable).ok_or_else(|| {
        JsgError::config(codes::CONFIG_SHAPE, "executable must be a string")
            .with_context("executable", raw.executable.to_string())
    })?;
    let name = extract_name(&executable);
    let with_alg = |err: JsgError| err.with_context("algorithm", name.clone());

    let mut located = Vec::with_capacity(raw.parameters_location.len());
    let mut declared_names = BTreeSet::new();
    for (key, location) in &raw.parameters_location {
        let names: Vec<String> = key.split_whitespace().map(str::to_string).collect();
        if names.is_empty() {
            return Err(with_alg(JsgError::config(
                codes::CONFIG_SHAPE,
                "parameter key cannot be empty",
            )));
        }
        for name in &names {
            if name == EXECUTABLE_COLUMN || !declared_names.insert(name.clone()) {
                return Err(with_alg(
                    JsgError::config(
                        codes::CONFIG_SHAPE,
                        "parameter name is reserved or declared twice",
                    )
                    .with_context("name", name.clone()),
                ));
            }
        }
        let locations = resolve_locations(key, &names, location).map_err(with_alg)?;
        located.push((key.clone(), names, locations));
    }

    let declared = raw
        .parameters_type
        .as_deref()
        .map(str::parse::<ParametersType>)
        .transpose()
        .map_err(with_alg)?;
    let parameters_type = check_parameter_types(&located, declared).map_err(with_alg)?;
    check_unique_locations(&located, parameters_type).map_err(with_alg)?;

    let mut parameters = Vec::with_capacity(located.len());
    for (key, names, locations) in located {
        let source = raw
            .parameters_values
            .get(&key)
            .or_else(|| common.get(&key))
            .ok_or_else(|| {
                with_alg(
                    JsgError::Config(
                        ErrorInfo::new(
                            codes::MISSING_PARAMETER_VALUES,
                            "key not found in parameters_values or common_parameter_values",
                        )
                        .with_context("key", key.clone()),
                    ),
                )
            })?;
        let values = resolve_values(&key, names.len(), source).map_err(with_alg)?;
        parameters.push(ParameterSpec {
            key,
            names,
            locations,
            values,
        });
    }

    debug!(
        algorithm = %name,
        parameters_type = %parameters_type,
        parameters = parameters.len(),
        "resolved algorithm"
    );
    Ok(AlgorithmConfig {
        executable,
        name,
        parameters_type,
        parameters,
    })
}

fn resolve_locations(key: &str, names: &[String], raw: &Value) -> Result<Vec<Location>, JsgError> {
    let locations = match raw {
        Value::Array(items) => items
            .iter()
            .map(Location::classify)
            .collect::<Result<Vec<_>, _>>()?,
        scalar if names.len() == 1 => vec![Location::classify(scalar)?],
        other => {
            return Err(JsgError::Config(
                ErrorInfo::new(
                    codes::INVALID_PARAMETER_LOCATION,
                    "tandem parameters need one location per name",
                )
                .with_context("key", key)
                .with_context("location", other.to_string()),
            ))
        }
    };
    if locations.len() != names.len() {
        return Err(JsgError::Config(
            ErrorInfo::new(
                codes::INVALID_PARAMETER_LOCATION,
                "number of locations does not match number of parameter names",
            )
            .with_context("key", key)
            .with_context("names", names.len().to_string())
            .with_context("locations", locations.len().to_string()),
        ));
    }
    Ok(locations)
}

type Located = (String, Vec<String>, Vec<Location>);

/// Infers the parameter type from the first location unless declared, then
/// requires every location of the algorithm to agree with it.
fn check_parameter_types(
    located: &[Located],
    declared: Option<ParametersType>,
) -> Result<ParametersType, JsgError> {
    let inferred = located
        .first()
        .and_then(|(_, _, locations)| locations.first())
        .map(Location::kind)
        .unwrap_or(ParametersType::None);
    let expected = declared.unwrap_or(inferred);
    if located.is_empty() && expected != ParametersType::None {
        return Err(JsgError::Config(
            ErrorInfo::new(
                codes::INCONSISTENT_PARAMETER_TYPE,
                "an algorithm without parameters must have parameters_type none",
            )
            .with_context("expected", expected.as_str()),
        ));
    }
    for (key, _, locations) in located {
        for location in locations {
            if location.kind() != expected {
                return Err(JsgError::Config(
                    ErrorInfo::new(
                        codes::INCONSISTENT_PARAMETER_TYPE,
                        "parameters_location does not have a consistent type",
                    )
                    .with_context("key", key.clone())
                    .with_context("expected", expected.as_str())
                    .with_context("found", location.kind().as_str()),
                ));
            }
        }
    }
    Ok(expected)
}

fn check_unique_locations(located: &[Located], kind: ParametersType) -> Result<(), JsgError> {
    if kind == ParametersType::None {
        return Ok(());
    }
    let mut seen = BTreeSet::new();
    for (key, _, locations) in located {
        for location in locations {
            if !seen.insert(location) {
                return Err(JsgError::Config(
                    ErrorInfo::new(
                        codes::DUPLICATE_PARAMETER_LOCATION,
                        "two parameters share the same location",
                    )
                    .with_context("key", key.clone())
                    .with_context("location", location.to_string()),
                ));
            }
        }
    }
    Ok(())
}

/// Expands the raw values of one key into tuples of width `width`.
fn resolve_values(key: &str, width: usize, raw: &Value) -> Result<Vec<Vec<String>>, JsgError> {
    let items: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        scalar => vec![scalar],
    };
    let mut tuples = Vec::new();
    if width == 1 {
        for item in items {
            if item.is_array() {
                return Err(malformed(key, "values of a single parameter cannot be nested lists"));
            }
            for value in expand(key, item)? {
                tuples.push(vec![value]);
            }
        }
        return Ok(tuples);
    }

    for item in items {
        let coordinates = match item {
            Value::Array(coordinates) if coordinates.len() == width => coordinates,
            _ => {
                return Err(malformed(
                    key,
                    "values of a tandem must be nested lists with one entry per name",
                )
                .with_context("width", width.to_string()))
            }
        };
        let expanded = coordinates
            .iter()
            .map(|coordinate| expand(key, coordinate))
            .collect::<Result<Vec<_>, _>>()?;
        let length = expanded[0].len();
        if let Some(other) = expanded.iter().find(|list| list.len() != length) {
            return Err(JsgError::Config(
                ErrorInfo::new(
                    codes::TANDEM_LENGTH_MISMATCH,
                    "different number of values in parameter tandem",
                )
                .with_context("key", key)
                .with_context("lengths", format!("{} vs {}", length, other.len())),
            ));
        }
        for idx in 0..length {
            tuples.push(expanded.iter().map(|list| list[idx].clone()).collect());
        }
    }
    Ok(tuples)
}

fn expand(key: &str, item: &Value) -> Result<Vec<String>, JsgError> {
    let expression = RangeExpression::from_value(item)
        .ok_or_else(|| malformed(key, "parameter values must be strings or numbers"))?;
    let resolved = expression
        .resolve()
        .map_err(|err| err.with_context("key", key))?;
    if let Some(RangeFallback::Literal { reason }) = &resolved.fallback {
        warn!(
            key,
            expression = expression.as_str(),
            reason = reason.as_str(),
            "range expression used verbatim"
        );
    }
    Ok(resolved.values)
}

fn malformed(key: &str, message: &str) -> JsgError {
    JsgError::Config(
        ErrorInfo::new(codes::MALFORMED_PARAMETER_VALUES, message).with_context("key", key),
    )
}
