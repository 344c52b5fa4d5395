use std::io;

use jsg_config::ExperimentConfig;

use crate::emitter::{node_cpus, ScriptContext, ScriptEmitter};
use crate::layout::OutputLayout;
use crate::partition::ScriptPlan;
use crate::render::{param_info, RenderFn};
use crate::writer::ScriptWriter;

/// Writes one node script for `plan`.
///
/// Algorithms appear in configuration order. Each block opens with the
/// column header echo, then every row echoes its values right before its
/// task line. `renderers` holds one renderer per algorithm of `config`.
pub fn write_node_script(
    out: &mut ScriptWriter<'_>,
    emitter: &dyn ScriptEmitter,
    config: &ExperimentConfig,
    renderers: &[RenderFn],
    plan: &ScriptPlan,
    layout: &OutputLayout,
) -> io::Result<()> {
    let ctx = ScriptContext {
        stem: plan.stem(),
        ncpus: node_cpus(&plan.table),
        directives: config.directives(),
        output_dir: &layout.output_dir,
        error_dir: &layout.error_dir,
    };
    emitter.begin(out, &ctx)?;
    for ((index, algorithm), render) in config.algorithms.iter().enumerate().zip(renderers) {
        let mut rows = plan
            .table
            .rows()
            .iter()
            .filter(|row| row.algorithm == index)
            .peekable();
        if rows.peek().is_none() {
            continue;
        }
        out.echo_param_info(&param_info(algorithm))?;
        for row in rows {
            let task = render(algorithm, row);
            out.echo_param_value(&task.echo)?;
            emitter.write_task(out, &task.command, row)?;
        }
    }
    emitter.finish(out, &ctx)
}
