use serde::{Deserialize, Serialize};

/// Names of the directories and files making up a generated script set.
///
/// `output_dir` and `error_dir` are relative to the directory the master
/// script runs from; they appear verbatim inside the generated scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    /// Subdirectory holding the per-node scripts.
    pub node_dir: String,
    /// Directory receiving stdout logs.
    pub output_dir: String,
    /// Directory receiving stderr logs.
    pub error_dir: String,
    /// File name of the master script.
    pub master_name: String,
    /// File name of the generation manifest.
    pub manifest_name: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            node_dir: "node".into(),
            output_dir: "output".into(),
            error_dir: "error".into(),
            master_name: "masterscript.sh".into(),
            manifest_name: "manifest.json".into(),
        }
    }
}
