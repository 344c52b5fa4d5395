use jsg_config::{AlgorithmConfig, ExperimentConfig};
use jsg_core::{codes, ErrorInfo, JsgError};
use tracing::{debug, info};

use crate::table::{InvocationRow, InvocationTable};

/// Spans the parameter space of a single algorithm.
///
/// Equivalent to a repeated cross join: starting from the executable, each
/// parameter (in declaration order) multiplies the rows built so far, so the
/// first declared parameter varies slowest and values keep their list order.
/// Cells are then rearranged into the algorithm's canonical column order.
pub fn span_cartesian_product(
    algorithm: &AlgorithmConfig,
    index: usize,
) -> Result<Vec<InvocationRow>, JsgError> {
    if let Some(empty) = algorithm.parameters.iter().find(|spec| spec.values.is_empty()) {
        return Err(JsgError::Config(
            ErrorInfo::new(
                codes::EMPTY_PARAMETER_VALUES,
                "parameter resolved to an empty value list",
            )
            .with_context("algorithm", algorithm.name.clone())
            .with_context("key", empty.key.clone()),
        ));
    }
    let expected = algorithm.expected_rows().ok_or_else(|| {
        JsgError::Space(
            ErrorInfo::new("space-overflow", "parameter space size overflows usize")
                .with_context("algorithm", algorithm.name.clone()),
        )
    })?;

    let mut partials: Vec<Vec<&str>> = vec![Vec::new()];
    for spec in &algorithm.parameters {
        let mut next = Vec::with_capacity(partials.len() * spec.cardinality());
        for partial in &partials {
            for tuple in &spec.values {
                let mut extended = partial.clone();
                extended.extend(tuple.iter().map(String::as_str));
                next.push(extended);
            }
        }
        partials = next;
    }
    debug_assert_eq!(partials.len(), expected);

    let declared: Vec<&str> = algorithm
        .parameters
        .iter()
        .flat_map(|spec| spec.names.iter().map(String::as_str))
        .collect();
    let order: Vec<(String, usize)> = algorithm
        .columns()
        .into_iter()
        .map(|column| {
            let position = declared
                .iter()
                .position(|name| *name == column.name)
                .unwrap_or_default();
            (column.name, position)
        })
        .collect();

    let rows: Vec<InvocationRow> = partials
        .into_iter()
        .map(|values| InvocationRow {
            algorithm: index,
            executable: algorithm.executable.clone(),
            cells: order
                .iter()
                .map(|(name, position)| (name.clone(), values[*position].to_string()))
                .collect(),
        })
        .collect();
    debug!(algorithm = %algorithm.name, rows = rows.len(), "spanned algorithm");
    Ok(rows)
}

/// Spans every algorithm of the experiment into one table, algorithms in
/// configuration order.
pub fn span_parameter_space(config: &ExperimentConfig) -> Result<InvocationTable, JsgError> {
    let mut table = InvocationTable::new();
    for (index, algorithm) in config.algorithms.iter().enumerate() {
        table.extend(span_cartesian_product(algorithm, index)?);
    }
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        "spanned parameter space"
    );
    Ok(table)
}
