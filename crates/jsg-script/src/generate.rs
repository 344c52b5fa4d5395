//! Writes a complete script set: node scripts, master script, manifest.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat, Utc};
use jsg_config::{BatchSystem, ExperimentConfig};
use jsg_core::{stable_hash_string, to_canonical_json_pretty, JsgError};
use jsg_space::InvocationTable;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::emitter::emitter_for;
use crate::layout::OutputLayout;
use crate::master::write_master_script;
use crate::partition::{partition, ScriptPlan};
use crate::render::{RenderFn, RendererRegistry};
use crate::script::write_node_script;
use crate::writer::ScriptWriter;

/// Separator used when neither the caller nor the document names one.
pub const DEFAULT_SEPARATOR: &str = "graphs";

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Suffix appended to every script name.
    pub name_suffix: String,
    /// Explicit separators; `None` defers to the document, then to [`DEFAULT_SEPARATOR`].
    pub separators: Option<Vec<String>>,
    /// File and directory names of the script set.
    pub layout: OutputLayout,
    /// Configuration file copied next to the master script.
    pub config_source: Option<PathBuf>,
    /// Timestamp recorded in the manifest; the current time when unset.
    pub created_at: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            name_suffix: "script".into(),
            separators: None,
            layout: OutputLayout::default(),
            config_source: None,
            created_at: None,
        }
    }
}

impl GenerateOptions {
    /// Separators in effect for `config`.
    pub fn resolve_separators(&self, config: &ExperimentConfig) -> Vec<String> {
        self.separators
            .clone()
            .or_else(|| config.separators.clone())
            .unwrap_or_else(|| vec![DEFAULT_SEPARATOR.to_string()])
    }
}

/// One node script in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSummary {
    /// File name inside the node directory.
    pub file_name: String,
    /// Number of invocations in the script.
    pub rows: usize,
}

/// Provenance record written next to the master script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationManifest {
    /// Target batch system.
    pub batch_system: BatchSystem,
    /// Separators the table was split by.
    pub separators: Vec<String>,
    /// Suffix of every script name.
    pub name_suffix: String,
    /// Stable hash of the resolved configuration.
    pub config_hash: String,
    /// Total number of invocations.
    pub total_rows: usize,
    /// Node scripts in submission order.
    pub scripts: Vec<ScriptSummary>,
    /// Master script file name.
    pub master: String,
    /// Generation timestamp (RFC 3339).
    pub created_at: String,
    /// Version of the generator.
    pub generator_version: String,
}

/// Paths written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Root of the script set.
    pub out_dir: PathBuf,
    /// Master script path.
    pub master: PathBuf,
    /// Node script paths in submission order.
    pub scripts: Vec<PathBuf>,
    /// Manifest path.
    pub manifest_path: PathBuf,
    /// Manifest contents.
    pub manifest: GenerationManifest,
}

/// `rs_<YYYYmmdd_HHMMSS>` in local time.
pub fn timestamped_output_dir() -> PathBuf {
    PathBuf::from(format!("rs_{}", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Validates renderers and partitions the table without touching the disk.
pub fn plan_scripts(
    config: &ExperimentConfig,
    table: &InvocationTable,
    options: &GenerateOptions,
) -> Result<Vec<ScriptPlan>, JsgError> {
    RendererRegistry::standard().validate(config)?;
    partition(table, &options.resolve_separators(config), &options.name_suffix)
}

/// Generates the full script set under `out_dir`.
///
/// All validation and partitioning happens before the first file is
/// created. Existing directories are reused; existing files are replaced.
pub fn generate(
    config: &ExperimentConfig,
    table: &InvocationTable,
    options: &GenerateOptions,
    out_dir: &Path,
) -> Result<GenerationReport, JsgError> {
    let registry = RendererRegistry::standard();
    registry.validate(config)?;
    let renderers = config
        .algorithms
        .iter()
        .map(|algorithm| registry.lookup(algorithm.parameters_type))
        .collect::<Result<Vec<RenderFn>, _>>()?;
    let separators = options.resolve_separators(config);
    let plans = partition(table, &separators, &options.name_suffix)?;
    let config_hash = stable_hash_string(config)?;

    let layout = &options.layout;
    let emitter = emitter_for(config.batch_system);
    let node_dir = out_dir.join(&layout.node_dir);
    fs::create_dir_all(&node_dir).map_err(|err| JsgError::io("output-dir", &node_dir, err))?;

    let mut scripts = Vec::with_capacity(plans.len());
    let mut summaries = Vec::with_capacity(plans.len());
    for plan in &plans {
        let path = node_dir.join(&plan.file_name);
        write_script_file(&path, |out| {
            write_node_script(out, emitter, config, &renderers, plan, layout)
        })?;
        debug!(script = %plan.file_name, rows = plan.table.len(), "wrote node script");
        scripts.push(path);
        summaries.push(ScriptSummary {
            file_name: plan.file_name.clone(),
            rows: plan.table.len(),
        });
    }

    let file_names: Vec<String> = plans.iter().map(|plan| plan.file_name.clone()).collect();
    let master = out_dir.join(&layout.master_name);
    write_script_file(&master, |out| {
        write_master_script(out, emitter, layout, &file_names)
    })?;

    if let Some(source) = &options.config_source {
        copy_config(source, out_dir)?;
    }

    let manifest = GenerationManifest {
        batch_system: config.batch_system,
        separators,
        name_suffix: options.name_suffix.clone(),
        config_hash,
        total_rows: table.len(),
        scripts: summaries,
        master: layout.master_name.clone(),
        created_at: options
            .created_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let manifest_path = out_dir.join(&layout.manifest_name);
    let json = to_canonical_json_pretty(&manifest)?;
    fs::write(&manifest_path, json)
        .map_err(|err| JsgError::io("manifest-write", &manifest_path, err))?;

    info!(
        out_dir = %out_dir.display(),
        batch_system = %config.batch_system,
        scripts = scripts.len(),
        rows = table.len(),
        "generated script set"
    );
    Ok(GenerationReport {
        out_dir: out_dir.to_path_buf(),
        master,
        scripts,
        manifest_path,
        manifest,
    })
}

/// Creates `path`, hands a writer to `body` and flushes before the file is
/// closed. The file is marked executable afterwards.
fn write_script_file<F>(path: &Path, body: F) -> Result<(), JsgError>
where
    F: FnOnce(&mut ScriptWriter<'_>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|err| JsgError::io("script-create", path, err))?;
    let mut buffered = BufWriter::new(file);
    let mut writer = ScriptWriter::new(&mut buffered);
    body(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|err| JsgError::io("script-write", path, err))?;
    drop(buffered);
    mark_executable(path)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), JsgError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|err| JsgError::io("script-permissions", path, err))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), JsgError> {
    Ok(())
}

fn copy_config(source: &Path, out_dir: &Path) -> Result<(), JsgError> {
    let name = source
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("run_config.json"));
    let target = out_dir.join(name);
    let same = match (fs::canonicalize(source), fs::canonicalize(&target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if same {
        return Ok(());
    }
    fs::copy(source, &target).map_err(|err| JsgError::io("config-copy", &target, err))?;
    Ok(())
}
