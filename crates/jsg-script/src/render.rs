//! Task-line renderers keyed by parameter type.

use std::collections::BTreeMap;

use jsg_config::{AlgorithmConfig, ExperimentConfig, Location, ParametersType, EXECUTABLE_COLUMN};
use jsg_core::{codes, ErrorInfo, JsgError};
use jsg_space::InvocationRow;

/// One invocation rendered for a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTask {
    /// Text echoed behind the parameter-value marker.
    pub echo: String,
    /// Command line handed to the emitter.
    pub command: String,
}

/// Renders one row of `algorithm`.
pub type RenderFn = fn(&AlgorithmConfig, &InvocationRow) -> RenderedTask;

/// Explicit mapping from parameter type to task-line renderer.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: BTreeMap<ParametersType, RenderFn>,
}

impl RendererRegistry {
    /// Registry with the `none`, `positional` and `named` renderers.
    pub fn standard() -> Self {
        let mut renderers: BTreeMap<ParametersType, RenderFn> = BTreeMap::new();
        renderers.insert(ParametersType::None, render_none);
        renderers.insert(ParametersType::Positional, render_positional);
        renderers.insert(ParametersType::Named, render_named);
        Self { renderers }
    }

    /// Registry without any renderer.
    pub fn empty() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
    }

    /// Adds or replaces the renderer for `kind`.
    pub fn register(&mut self, kind: ParametersType, render: RenderFn) {
        self.renderers.insert(kind, render);
    }

    /// Renderer for `kind`.
    pub fn lookup(&self, kind: ParametersType) -> Result<RenderFn, JsgError> {
        self.renderers.get(&kind).copied().ok_or_else(|| {
            JsgError::Script(
                ErrorInfo::new(
                    codes::UNKNOWN_PARAMETERS_TYPE,
                    "no task renderer registered for parameters_type",
                )
                .with_context("parameters_type", kind.as_str()),
            )
        })
    }

    /// Checks that every algorithm of `config` has a renderer.
    pub fn validate(&self, config: &ExperimentConfig) -> Result<(), JsgError> {
        for algorithm in &config.algorithms {
            self.lookup(algorithm.parameters_type)
                .map_err(|err| err.with_context("algorithm", algorithm.name.clone()))?;
        }
        Ok(())
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Column header echoed once per algorithm block: executable, then parameters.
pub fn param_info(algorithm: &AlgorithmConfig) -> String {
    std::iter::once(EXECUTABLE_COLUMN.to_string())
        .chain(algorithm.columns().into_iter().map(|column| column.name))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_none(algorithm: &AlgorithmConfig, row: &InvocationRow) -> RenderedTask {
    RenderedTask {
        echo: algorithm.name.clone(),
        command: row.executable.clone(),
    }
}

fn render_positional(_algorithm: &AlgorithmConfig, row: &InvocationRow) -> RenderedTask {
    let line = std::iter::once(row.executable.as_str())
        .chain(row.values())
        .collect::<Vec<_>>()
        .join(" ");
    RenderedTask {
        echo: line.clone(),
        command: line,
    }
}

fn render_named(algorithm: &AlgorithmConfig, row: &InvocationRow) -> RenderedTask {
    let flags: BTreeMap<String, String> = algorithm
        .columns()
        .into_iter()
        .filter_map(|column| match column.location {
            Location::Named(flag) => Some((column.name, flag)),
            Location::None | Location::Positional(_) => None,
        })
        .collect();
    let mut echo = vec![row.executable.as_str()];
    let mut command = vec![row.executable.as_str()];
    for (name, value) in &row.cells {
        echo.push(value);
        if let Some(flag) = flags.get(name) {
            command.push(flag);
        }
        command.push(value);
    }
    RenderedTask {
        echo: echo.join(" "),
        command: command.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsg_config::parse_config;
    use jsg_space::span_cartesian_product;

    fn first_task(doc: &str) -> (String, RenderedTask) {
        let config = parse_config(doc).unwrap();
        let algorithm = &config.algorithms[0];
        let rows = span_cartesian_product(algorithm, 0).unwrap();
        let render = RendererRegistry::standard()
            .lookup(algorithm.parameters_type)
            .unwrap();
        (param_info(algorithm), render(algorithm, &rows[0]))
    }

    #[test]
    fn named_tasks_put_flags_before_values() {
        let (info, task) = first_task(
            r#"{"batch_system": "local", "algorithms": [{"executable": "./kc",
                "parameters_location": {"threads": "-t", "graphs": "-f"},
                "parameters_values": {"threads": "4", "graphs": "g.el"}}]}"#,
        );
        assert_eq!(info, "executable graphs threads");
        assert_eq!(task.echo, "./kc g.el 4");
        assert_eq!(task.command, "./kc -f g.el -t 4");
    }

    #[test]
    fn positional_tasks_echo_the_command() {
        let (info, task) = first_task(
            r#"{"batch_system": "local", "algorithms": [{"executable": "exe",
                "parameters_location": {"a": 2, "b": 1},
                "parameters_values": {"a": "x", "b": "y"}}]}"#,
        );
        assert_eq!(info, "executable b a");
        assert_eq!(task.echo, "exe y x");
        assert_eq!(task.command, task.echo);
    }

    #[test]
    fn parameterless_tasks_echo_the_short_name() {
        let (info, task) = first_task(
            r#"{"batch_system": "local", "algorithms": [{"executable": "./bin/setup.sh",
                "parameters_location": {"graphs": "none"},
                "parameters_values": {"graphs": "g.el"}}]}"#,
        );
        assert_eq!(info, "executable graphs");
        assert_eq!(task.echo, "setup_sh");
        assert_eq!(task.command, "./bin/setup.sh");
    }

    #[test]
    fn missing_renderer_fails_validation() {
        let config = parse_config(
            r#"{"batch_system": "local", "algorithms": [{"executable": "exe"}]}"#,
        )
        .unwrap();
        let err = RendererRegistry::empty().validate(&config).unwrap_err();
        assert_eq!(err.code(), codes::UNKNOWN_PARAMETERS_TYPE);
        assert_eq!(err.info().context.get("algorithm").map(String::as_str), Some("exe"));
        assert!(RendererRegistry::standard().validate(&config).is_ok());
    }
}
