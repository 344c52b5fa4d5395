use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jsg_config::{load_config, split_separators, BatchSystem, ParametersType};
use jsg_core::to_canonical_json_pretty;
use jsg_script::{plan_scripts, GenerateOptions};
use jsg_space::{span_cartesian_product, InvocationTable};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration document.
    #[arg(short, long, default_value = "run_config.json")]
    pub input: PathBuf,
    /// Separators to check, as for `generate`.
    #[arg(short, long)]
    pub separator: Option<String>,
}

#[derive(Debug, Serialize)]
struct AlgorithmSummary {
    name: String,
    executable: String,
    parameters_type: ParametersType,
    columns: Vec<String>,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct ValidationSummary {
    batch_system: BatchSystem,
    algorithms: Vec<AlgorithmSummary>,
    total_rows: usize,
    separators: Vec<String>,
    scripts: usize,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.input)?;
    let mut algorithms = Vec::with_capacity(config.algorithms.len());
    let mut table = InvocationTable::new();
    for (index, algorithm) in config.algorithms.iter().enumerate() {
        let rows = span_cartesian_product(algorithm, index)?;
        algorithms.push(AlgorithmSummary {
            name: algorithm.name.clone(),
            executable: algorithm.executable.clone(),
            parameters_type: algorithm.parameters_type,
            columns: algorithm.columns().into_iter().map(|column| column.name).collect(),
            rows: rows.len(),
        });
        table.extend(rows);
    }
    let options = GenerateOptions {
        separators: args.separator.as_deref().map(split_separators),
        ..GenerateOptions::default()
    };
    let plans = plan_scripts(&config, &table, &options)?;
    let summary = ValidationSummary {
        batch_system: config.batch_system,
        algorithms,
        total_rows: table.len(),
        separators: options.resolve_separators(&config),
        scripts: plans.len(),
    };
    println!("{}", to_canonical_json_pretty(&summary)?);
    Ok(())
}
