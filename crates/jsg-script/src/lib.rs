#![deny(missing_docs)]
#![doc = "Partitioning of invocation tables and emission of batch-system job scripts."]

pub mod audit;
pub mod emitter;
pub mod generate;
/// File and directory names of a script set.
pub mod layout;
/// Master script builder.
pub mod master;
pub mod partition;
pub mod render;
/// Per-node script body.
pub mod script;
/// Line-oriented script writer.
pub mod writer;

pub use audit::{parse_audit_line, AuditLine, PARAM_INFO, PARAM_VALUE, PROGRAM_OUTPUT};
pub use emitter::{
    emitter_for, node_cpus, LocalEmitter, LsfEmitter, ScriptContext, ScriptEmitter, SlurmEmitter,
    THREADS_COLUMN,
};
pub use generate::{
    generate, plan_scripts, timestamped_output_dir, GenerateOptions, GenerationManifest,
    GenerationReport, ScriptSummary, DEFAULT_SEPARATOR,
};
pub use layout::OutputLayout;
pub use master::write_master_script;
pub use partition::{partition, ScriptPlan, MISSING_TOKEN};
pub use render::{param_info, RenderFn, RenderedTask, RendererRegistry};
pub use script::write_node_script;
pub use writer::ScriptWriter;
