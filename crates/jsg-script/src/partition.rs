//! Recursive splitting of an invocation table into per-script cells.

use std::collections::BTreeSet;

use jsg_config::extract_name;
use jsg_core::{codes, ErrorInfo, JsgError};
use jsg_space::InvocationTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token used for rows that have no value for a separator column.
pub const MISSING_TOKEN: &str = "na";

/// One output script: its file name and the rows it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPlan {
    /// File name, `run<_token...>_<suffix>.sh`.
    pub file_name: String,
    /// Rows of the partition cell, in table order.
    pub table: InvocationTable,
}

impl ScriptPlan {
    /// File name without the `.sh` extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .strip_suffix(".sh")
            .unwrap_or(&self.file_name)
    }
}

/// Splits `table` by each separator in turn.
///
/// Distinct values are visited in first-seen order and sanitised into
/// filename tokens; values that sanitise to an already used token get a
/// `_2`, `_3`, ... suffix, and so does a full file name already produced
/// along another path. Rows lacking the column form a cell of their
/// own under [`MISSING_TOKEN`]. With no separators the whole table becomes
/// one plan.
pub fn partition(
    table: &InvocationTable,
    separators: &[String],
    name_suffix: &str,
) -> Result<Vec<ScriptPlan>, JsgError> {
    if let Some(unknown) = separators.iter().find(|name| !table.has_column(name)) {
        return Err(JsgError::Config(
            ErrorInfo::new(
                codes::INVALID_SEPARATOR,
                "separator is not a column of the parameter space",
            )
            .with_context("separator", unknown.clone())
            .with_hint(format!("available columns: {}", table.columns().join(", "))),
        ));
    }
    let mut plans = Vec::new();
    let mut stems = BTreeSet::new();
    split(table, separators, String::new(), name_suffix, &mut stems, &mut plans);
    debug!(scripts = plans.len(), rows = table.len(), "partitioned invocation table");
    Ok(plans)
}

fn split(
    table: &InvocationTable,
    separators: &[String],
    prefix: String,
    name_suffix: &str,
    stems: &mut BTreeSet<String>,
    plans: &mut Vec<ScriptPlan>,
) {
    let Some((current, rest)) = separators.split_first() else {
        // Stems are unique across the whole tree: tokens joined along
        // different paths can spell the same name.
        let stem = unique_token(&format!("run{prefix}_{name_suffix}"), stems);
        plans.push(ScriptPlan {
            file_name: format!("{stem}.sh"),
            table: table.clone(),
        });
        return;
    };
    let mut used = BTreeSet::new();
    for value in table.distinct(current) {
        let base = value.map_or_else(|| MISSING_TOKEN.to_string(), extract_name);
        let token = unique_token(&base, &mut used);
        let cell = table.subset(|row| row.get(current) == value);
        split(&cell, rest, format!("{prefix}_{token}"), name_suffix, stems, plans);
    }
}

fn unique_token(base: &str, used: &mut BTreeSet<String>) -> String {
    let mut token = base.to_string();
    let mut counter = 2;
    while !used.insert(token.clone()) {
        token = format!("{base}_{counter}");
        counter += 1;
    }
    token
}
