#![deny(missing_docs)]
#![doc = "Parsing and validation of declarative experiment descriptions."]

pub mod comments;
/// Validated experiment model.
pub mod model;
pub mod names;
mod parse;
pub mod range;
pub mod separators;

pub use comments::strip_comments;
pub use model::{
    AlgorithmConfig, BatchSystem, Column, Directives, ExperimentConfig, Location, ParameterSpec,
    ParametersType,
};
pub use names::extract_name;
pub use parse::{load_config, parse_config};
pub use range::{RangeExpression, RangeFallback, ResolvedRange};
pub use separators::{parse_separators, split_separators, EXECUTABLE_COLUMN};
